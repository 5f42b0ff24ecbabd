//! Team repository for database operations.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use domain::models::Team;
use domain::services::check_claimable;
use domain::MembershipError;

use crate::entities::{
    MemberEntity, TeamEntity, TeamLeaderCountEntity, TeamReportEntity, TeamStatusDb,
    TeamWithMembershipEntity,
};
use crate::error::WorkflowError;
use crate::metrics::QueryTimer;

const TEAM_COLUMNS: &str = "id, name, politician_name, position, county_id, district_id, \
     registration_code, status, code_used, leader_id, created_at, updated_at";

/// Repository for team-related database operations.
#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    /// Creates a new TeamRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a pending team with its registration code.
    pub async fn create_team(
        &self,
        name: &str,
        politician_name: &str,
        position: &str,
        county_id: Option<Uuid>,
        district_id: Option<Uuid>,
        registration_code: &str,
    ) -> Result<TeamEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_team");
        let result = sqlx::query_as::<_, TeamEntity>(&format!(
            r#"
            INSERT INTO groups (name, politician_name, position, county_id, district_id, registration_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(politician_name)
        .bind(position)
        .bind(county_id)
        .bind(district_id)
        .bind(registration_code)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a team by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TeamEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_team_by_id");
        let result = sqlx::query_as::<_, TeamEntity>(&format!(
            "SELECT {TEAM_COLUMNS} FROM groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Check if a registration code exists.
    pub async fn registration_code_exists(&self, code: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_registration_code_exists");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM groups WHERE registration_code = $1)
            "#,
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Generate a unique registration code by retrying on collision.
    pub async fn generate_unique_code<F>(&self, generator: F) -> Result<String, sqlx::Error>
    where
        F: Fn() -> String,
    {
        let mut code = generator();
        let mut attempts = 0;

        while self.registration_code_exists(&code).await? {
            code = generator();
            attempts += 1;
            if attempts > 100 {
                return Err(sqlx::Error::Protocol(
                    "Could not generate unique registration code".to_string(),
                ));
            }
        }

        Ok(code)
    }

    /// Claim a team with its registration code and make the claimer its leader.
    ///
    /// The code must already be normalised. The team row is locked for the
    /// duration of the transaction and the update is conditional on
    /// `code_used = false`, so of two concurrent claims only one succeeds.
    pub async fn claim_team(
        &self,
        registration_code: &str,
        auth_user_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<(TeamEntity, MemberEntity), WorkflowError> {
        let timer = QueryTimer::new("claim_team");
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_as::<_, TeamEntity>(&format!(
            "SELECT {TEAM_COLUMNS} FROM groups WHERE registration_code = $1 FOR UPDATE"
        ))
        .bind(registration_code)
        .fetch_optional(&mut *tx)
        .await?
        .map(Team::from);

        let team = check_claimable(locked.as_ref())?;

        let claimed = sqlx::query_as::<_, TeamEntity>(&format!(
            r#"
            UPDATE groups
            SET code_used = true, leader_id = $2, status = 'active', updated_at = NOW()
            WHERE id = $1 AND code_used = false
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(team.id)
        .bind(auth_user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(MembershipError::RegistrationCodeUsed)?;

        let leader = sqlx::query_as::<_, MemberEntity>(
            r#"
            INSERT INTO members (auth_user_id, group_id, name, email, role, is_leader, status)
            VALUES ($1, $2, $3, $4, 'leader', true, 'active')
            RETURNING id, auth_user_id, group_id, name, email, role, is_leader, status,
                      invitation_id, created_at, updated_at
            "#,
        )
        .bind(auth_user_id)
        .bind(claimed.id)
        .bind(name)
        .bind(email)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();

        info!(
            team_id = %claimed.id,
            member_id = %leader.id,
            user_id = %auth_user_id,
            "Team claimed"
        );

        Ok((claimed, leader))
    }

    /// Set a team's lifecycle status.
    ///
    /// A pending team cannot be activated here; activation happens by claim.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: TeamStatusDb,
    ) -> Result<Option<TeamEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_team_status");
        let result = sqlx::query_as::<_, TeamEntity>(&format!(
            r#"
            UPDATE groups
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND (code_used = true OR $2 <> 'active'::team_status)
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List the teams where the user has an active membership.
    pub async fn list_for_user(
        &self,
        auth_user_id: Uuid,
    ) -> Result<Vec<TeamWithMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_teams_for_user");
        let result = sqlx::query_as::<_, TeamWithMembershipEntity>(
            r#"
            SELECT
                g.id, g.name, g.politician_name, g.status,
                m.id as membership_id, m.role, m.is_leader, m.status as membership_status,
                m.created_at as joined_at,
                (SELECT COUNT(*) FROM members am
                 WHERE am.group_id = g.id AND am.status = 'active') as active_member_count
            FROM members m
            JOIN groups g ON g.id = m.group_id
            WHERE m.auth_user_id = $1 AND m.status = 'active'
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(auth_user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Team report with member and invitation counts.
    pub async fn report(&self) -> Result<Vec<TeamReportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("team_report");
        let result = sqlx::query_as::<_, TeamReportEntity>(
            r#"
            SELECT
                g.id, g.name, g.politician_name, g.status, g.registration_code,
                g.code_used, g.leader_id,
                l.name as leader_name,
                (SELECT COUNT(*) FROM members m
                 WHERE m.group_id = g.id AND m.status = 'active') as active_member_count,
                (SELECT COUNT(*) FROM members m
                 WHERE m.group_id = g.id AND m.status = 'inactive') as inactive_member_count,
                (SELECT COUNT(*) FROM team_invitations i
                 WHERE i.group_id = g.id) as invitation_count,
                g.created_at
            FROM groups g
            LEFT JOIN members l
                ON l.group_id = g.id AND l.is_leader AND l.status = 'active'
            ORDER BY g.created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All teams with their number of active leader rows.
    pub async fn list_with_leader_counts(
        &self,
    ) -> Result<Vec<TeamLeaderCountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_teams_with_leader_counts");
        let result = sqlx::query_as::<_, TeamLeaderCountEntity>(
            r#"
            SELECT
                g.id, g.name, g.politician_name, g.position, g.county_id, g.district_id,
                g.registration_code, g.status, g.code_used, g.leader_id,
                g.created_at, g.updated_at,
                (SELECT COUNT(*) FROM members m
                 WHERE m.group_id = g.id AND m.is_leader AND m.status = 'active') as active_leader_count
            FROM groups g
            ORDER BY g.created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // Note: TeamRepository tests require database connection and are covered by integration tests
}
