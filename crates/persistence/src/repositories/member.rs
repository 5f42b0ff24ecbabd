//! Member repository for database operations.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use domain::models::Member;
use domain::services::{evaluate_removal, verify_removal, RemovalDecision};

use crate::entities::MemberEntity;
use crate::error::WorkflowError;
use crate::metrics::QueryTimer;

const MEMBER_COLUMNS: &str = "id, auth_user_id, group_id, name, email, role, is_leader, status, \
     invitation_id, created_at, updated_at";

/// Result of a removal request.
#[derive(Debug, Clone)]
pub struct RemovalOutcome {
    pub member: MemberEntity,
    pub already_removed: bool,
}

/// Repository for member-related database operations.
#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Creates a new MemberRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a member by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_member_by_id");
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user's membership row in a team, whatever its status.
    pub async fn find_membership(
        &self,
        group_id: Uuid,
        auth_user_id: Uuid,
    ) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_membership");
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE group_id = $1 AND auth_user_id = $2"
        ))
        .bind(group_id)
        .bind(auth_user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List a team's members; leaders first, then by join date.
    pub async fn list_for_team(
        &self,
        group_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_team_members");
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM members
            WHERE group_id = $1 AND ($2 OR status = 'active')
            ORDER BY is_leader DESC, created_at ASC
            "#
        ))
        .bind(group_id)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count a team's active members.
    pub async fn count_active(&self, group_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_active_members");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM members WHERE group_id = $1 AND status = 'active'
            "#,
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Remove (deactivate) a member on behalf of the team leader.
    ///
    /// Both rows are locked, the preconditions are checked, and the update is
    /// conditional on the target still being active. The row returned by the
    /// update is checked again before commit.
    pub async fn remove_member(
        &self,
        team_id: Uuid,
        operator_auth_user_id: Uuid,
        member_id: Uuid,
    ) -> Result<RemovalOutcome, WorkflowError> {
        let timer = QueryTimer::new("remove_member");
        let mut tx = self.pool.begin().await?;

        let operator = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            SELECT {MEMBER_COLUMNS} FROM members
            WHERE group_id = $1 AND auth_user_id = $2
            FOR UPDATE
            "#
        ))
        .bind(team_id)
        .bind(operator_auth_user_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(Member::from);

        let target_entity = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1 FOR UPDATE"
        ))
        .bind(member_id)
        .fetch_optional(&mut *tx)
        .await?;
        let target = target_entity.clone().map(Member::from);

        let decision = evaluate_removal(team_id, operator.as_ref(), target.as_ref())?;

        let outcome = match (decision, target_entity) {
            (RemovalDecision::AlreadyRemoved, Some(member)) => RemovalOutcome {
                member,
                already_removed: true,
            },
            _ => {
                let updated = sqlx::query_as::<_, MemberEntity>(&format!(
                    r#"
                    UPDATE members
                    SET status = 'inactive', updated_at = NOW()
                    WHERE id = $1 AND group_id = $2 AND status = 'active'
                    RETURNING {MEMBER_COLUMNS}
                    "#
                ))
                .bind(member_id)
                .bind(team_id)
                .fetch_optional(&mut *tx)
                .await?;

                let checked = updated.clone().map(Member::from);
                if let Err(e) = verify_removal(checked.as_ref()) {
                    warn!(
                        team_id = %team_id,
                        member_id = %member_id,
                        "Member status change did not apply; rolling back"
                    );
                    return Err(e.into());
                }

                RemovalOutcome {
                    member: updated.ok_or(sqlx::Error::RowNotFound)?,
                    already_removed: false,
                }
            }
        };

        tx.commit().await?;
        timer.record();

        info!(
            team_id = %team_id,
            member_id = %member_id,
            operator_id = %operator_auth_user_id,
            already_removed = outcome.already_removed,
            "Member removal processed"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    // Note: MemberRepository tests require database connection and are covered by integration tests
}
