//! Invitation repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use domain::models::{Invitation, Member};
use domain::services::{plan_redemption, repaired_usage, MembershipAction};
use domain::MembershipError;

use crate::entities::{
    InvitationEntity, InvitationStatusDb, InvitationWithTeamEntity, MemberEntity, TeamEntity,
};
use crate::error::WorkflowError;
use crate::metrics::QueryTimer;

const INVITATION_COLUMNS: &str = "id, invite_code, group_id, max_uses, current_uses, status, \
     expires_at, used_by, used_at, created_by, created_at, updated_at";

/// Rows written by a successful redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub team: TeamEntity,
    pub member: MemberEntity,
    pub invitation: InvitationEntity,
}

/// Repository for invitation-related database operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Creates a new InvitationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new invitation.
    pub async fn create_invitation(
        &self,
        group_id: Uuid,
        invite_code: &str,
        max_uses: i32,
        expires_at: DateTime<Utc>,
        created_by: Uuid,
    ) -> Result<InvitationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            INSERT INTO team_invitations (invite_code, group_id, max_uses, expires_at, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(invite_code)
        .bind(group_id)
        .bind(max_uses)
        .bind(expires_at)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find invitation by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation_by_id");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM team_invitations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find invitation by code with team info (for public lookup).
    pub async fn find_by_code_with_team(
        &self,
        code: &str,
    ) -> Result<Option<InvitationWithTeamEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation_by_code_with_team");
        let result = sqlx::query_as::<_, InvitationWithTeamEntity>(
            r#"
            SELECT
                i.id, i.invite_code, i.group_id, i.max_uses, i.current_uses, i.status,
                i.expires_at, i.used_by, i.used_at, i.created_by, i.created_at, i.updated_at,
                g.name as team_name, g.politician_name, g.status as team_status
            FROM team_invitations i
            JOIN groups g ON i.group_id = g.id
            WHERE i.invite_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List invitations, newest first; all teams when `group_id` is `None`.
    pub async fn list(&self, group_id: Option<Uuid>) -> Result<Vec<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invitations");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM team_invitations
            WHERE $1::uuid IS NULL OR group_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Check if code exists.
    pub async fn code_exists(&self, code: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_invite_code_exists");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM team_invitations WHERE invite_code = $1)
            "#,
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Generate unique invite code by retrying if collision.
    pub async fn generate_unique_code<F>(&self, generator: F) -> Result<String, sqlx::Error>
    where
        F: Fn() -> String,
    {
        let mut code = generator();
        let mut attempts = 0;

        while self.code_exists(&code).await? {
            code = generator();
            attempts += 1;
            if attempts > 100 {
                return Err(sqlx::Error::Protocol(
                    "Could not generate unique invite code".to_string(),
                ));
            }
        }

        Ok(code)
    }

    /// Redeem an invitation code and admit the user to its team.
    ///
    /// The invitation row is locked for the whole transaction. Counter,
    /// status and membership changes commit together or not at all.
    pub async fn redeem(
        &self,
        invite_code: &str,
        auth_user_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<Redemption, WorkflowError> {
        let timer = QueryTimer::new("redeem_invitation");
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM team_invitations WHERE invite_code = $1 FOR UPDATE"
        ))
        .bind(invite_code)
        .fetch_optional(&mut *tx)
        .await?
        .map(Invitation::from);

        let invitation = locked.as_ref().ok_or(MembershipError::InvitationNotFound)?;

        let team = sqlx::query_as::<_, TeamEntity>(
            r#"
            SELECT id, name, politician_name, position, county_id, district_id,
                   registration_code, status, code_used, leader_id, created_at, updated_at
            FROM groups
            WHERE id = $1
            FOR SHARE
            "#,
        )
        .bind(invitation.group_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(MembershipError::TeamNotFound)?;

        let existing = sqlx::query_as::<_, MemberEntity>(
            r#"
            SELECT id, auth_user_id, group_id, name, email, role, is_leader, status,
                   invitation_id, created_at, updated_at
            FROM members
            WHERE group_id = $1 AND auth_user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(invitation.group_id)
        .bind(auth_user_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(Member::from);

        let plan = plan_redemption(
            locked.as_ref(),
            team.status.into(),
            existing.as_ref(),
            Utc::now(),
        )?;

        let updated = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            UPDATE team_invitations
            SET current_uses = $2, status = $3, used_by = $4, used_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND current_uses = $2 - 1
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(plan.invitation_id)
        .bind(plan.new_uses)
        .bind(InvitationStatusDb::from(plan.new_status))
        .bind(auth_user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(MembershipError::InvitationExhausted)?;

        let member = match plan.membership {
            MembershipAction::Create => {
                sqlx::query_as::<_, MemberEntity>(
                    r#"
                    INSERT INTO members (auth_user_id, group_id, name, email, role, is_leader, status, invitation_id)
                    VALUES ($1, $2, $3, $4, 'staff', false, 'active', $5)
                    RETURNING id, auth_user_id, group_id, name, email, role, is_leader, status,
                              invitation_id, created_at, updated_at
                    "#,
                )
                .bind(auth_user_id)
                .bind(plan.group_id)
                .bind(name)
                .bind(email)
                .bind(plan.invitation_id)
                .fetch_one(&mut *tx)
                .await?
            }
            MembershipAction::Reactivate(member_id) => {
                sqlx::query_as::<_, MemberEntity>(
                    r#"
                    UPDATE members
                    SET status = 'active', role = 'staff', is_leader = false,
                        name = $2, email = $3, invitation_id = $4, updated_at = NOW()
                    WHERE id = $1 AND status = 'inactive'
                    RETURNING id, auth_user_id, group_id, name, email, role, is_leader, status,
                              invitation_id, created_at, updated_at
                    "#,
                )
                .bind(member_id)
                .bind(name)
                .bind(email)
                .bind(plan.invitation_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(MembershipError::AlreadyMember)?
            }
        };

        tx.commit().await?;
        timer.record();

        info!(
            invitation_id = %updated.id,
            team_id = %team.id,
            member_id = %member.id,
            user_id = %auth_user_id,
            current_uses = updated.current_uses,
            max_uses = updated.max_uses,
            "Invitation redeemed"
        );

        Ok(Redemption {
            team,
            member,
            invitation: updated,
        })
    }

    /// Reset an invitation: new code, counters cleared, new expiry.
    ///
    /// When `group_id` is given the invitation must belong to that team.
    pub async fn reset_invitation(
        &self,
        id: Uuid,
        group_id: Option<Uuid>,
        new_code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("reset_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            UPDATE team_invitations
            SET invite_code = $3, current_uses = 0, status = 'active',
                used_by = NULL, used_at = NULL, expires_at = $4, updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR group_id = $2)
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(group_id)
        .bind(new_code)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        if let Ok(Some(invitation)) = &result {
            info!(invitation_id = %invitation.id, team_id = %invitation.group_id, "Invitation reset");
        }
        result
    }

    /// Invitations that name a redeemer but count zero uses.
    pub async fn find_usage_repair_candidates(
        &self,
    ) -> Result<Vec<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_usage_repair_candidates");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM team_invitations
            WHERE used_by IS NOT NULL AND current_uses = 0
            ORDER BY created_at
            "#
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Set `current_uses = 1` on invitations with a redeemer but no recorded
    /// use, and recompute their status. Returns the repaired rows.
    pub async fn repair_usage(&self) -> Result<Vec<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("repair_invitation_usage");
        let mut tx = self.pool.begin().await?;

        let candidates = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM team_invitations
            WHERE used_by IS NOT NULL AND current_uses = 0
            FOR UPDATE
            "#
        ))
        .fetch_all(&mut *tx)
        .await?;

        let mut repaired = Vec::with_capacity(candidates.len());
        for entity in candidates {
            let invitation = Invitation::from(entity);
            let Some((uses, status)) = repaired_usage(&invitation) else {
                continue;
            };

            let row = sqlx::query_as::<_, InvitationEntity>(&format!(
                r#"
                UPDATE team_invitations
                SET current_uses = $2, status = $3, updated_at = NOW()
                WHERE id = $1
                RETURNING {INVITATION_COLUMNS}
                "#
            ))
            .bind(invitation.id)
            .bind(uses)
            .bind(InvitationStatusDb::from(status))
            .fetch_one(&mut *tx)
            .await?;
            repaired.push(row);
        }

        tx.commit().await?;
        timer.record();

        info!(count = repaired.len(), "Invitation usage repaired");
        Ok(repaired)
    }

    /// Invitations whose stored status disagrees with their counters.
    pub async fn find_status_mismatches(&self) -> Result<Vec<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation_status_mismatches");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM team_invitations
            WHERE status <> (CASE WHEN current_uses >= max_uses
                                  THEN 'exhausted' ELSE 'active' END)::invitation_status
            ORDER BY created_at
            "#
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Recompute every invitation's status from its counters.
    /// Returns the number of rows changed.
    pub async fn sync_status(&self) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("sync_invitation_status");
        let result = sqlx::query(
            r#"
            UPDATE team_invitations
            SET status = (CASE WHEN current_uses >= max_uses
                               THEN 'exhausted' ELSE 'active' END)::invitation_status,
                updated_at = NOW()
            WHERE status <> (CASE WHEN current_uses >= max_uses
                                  THEN 'exhausted' ELSE 'active' END)::invitation_status
            "#,
        )
        .execute(&self.pool)
        .await?;
        timer.record();

        info!(count = result.rows_affected(), "Invitation status synchronised");
        Ok(result.rows_affected())
    }
}
