//! Query timing and pool gauges, exported through the `metrics` facade.
//!
//! Without an installed recorder every call here is a no-op, so repositories
//! time their queries unconditionally.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Publishes connection pool occupancy.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("polify_db_connections_total").set(size as f64);
    gauge!("polify_db_connections_idle").set(idle as f64);
    gauge!("polify_db_connections_active").set(size.saturating_sub(idle) as f64);
}

/// Times one repository operation.
///
/// The sample is taken when the timer is dropped, so an operation that
/// bails out with `?` is still counted. `record` ends the measurement early.
///
/// ```ignore
/// let timer = QueryTimer::new("find_team_by_id");
/// let result = sqlx::query_as::<_, TeamEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Records the elapsed time and bumps the operation counter.
    pub fn record(self) {
        drop(self);
    }
}

impl Drop for QueryTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        histogram!("polify_db_query_duration_seconds", "operation" => self.operation)
            .record(elapsed);
        counter!("polify_db_queries_total", "operation" => self.operation).increment(1);
    }
}
