//! Commands that change data. Each one prints what it is about to do and
//! asks for confirmation first.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::Args;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::invitation::{generate_invite_code, DEFAULT_INVITATION_TTL_HOURS};
use domain::models::{Invitation, Member, Team, TeamStatus};
use domain::services::repaired_usage;
use persistence::repositories::{InvitationRepository, MemberRepository, TeamRepository};

use crate::confirm::confirm;

/// Arguments for `polify-admin reset-invitation`.
#[derive(Args, Debug)]
pub struct ResetInvitationArgs {
    /// Invitation to reset.
    #[arg(long)]
    pub id: Uuid,
}

/// Arguments for `polify-admin remove-member`.
#[derive(Args, Debug)]
pub struct RemoveMemberArgs {
    #[arg(long)]
    pub team: Uuid,

    /// Auth user id of the leader performing the removal.
    #[arg(long)]
    pub operator: Uuid,

    /// Member row id to deactivate.
    #[arg(long)]
    pub member: Uuid,
}

/// Arguments for `polify-admin set-team-status`.
#[derive(Args, Debug)]
pub struct SetTeamStatusArgs {
    #[arg(long)]
    pub team: Uuid,

    /// pending, active or inactive.
    #[arg(long)]
    pub status: TeamStatus,
}

fn aborted() -> Result<u8> {
    println!("Aborted; nothing changed");
    Ok(1)
}

/// Sets `current_uses = 1` on invitations that name a redeemer but record no use.
pub async fn run_repair_invitation_usage(pool: &PgPool, assume_yes: bool) -> Result<u8> {
    let repo = InvitationRepository::new(pool.clone());
    let candidates: Vec<Invitation> = repo
        .find_usage_repair_candidates()
        .await?
        .into_iter()
        .map(Invitation::from)
        .collect();

    if candidates.is_empty() {
        println!("No invitations need repair");
        return Ok(0);
    }

    println!("{} invitation(s) will be updated:", candidates.len());
    for invitation in &candidates {
        if let Some((uses, status)) = repaired_usage(invitation) {
            println!(
                "  {} ({}): uses 0 -> {}, status {} -> {}",
                invitation.id, invitation.invite_code, uses, invitation.status, status
            );
        }
    }

    if !confirm(assume_yes)? {
        return aborted();
    }

    let repaired = repo.repair_usage().await?;
    println!("Repaired {} invitation(s)", repaired.len());
    Ok(0)
}

/// Recomputes every invitation's status from its counters.
pub async fn run_sync_invitation_status(pool: &PgPool, assume_yes: bool) -> Result<u8> {
    let repo = InvitationRepository::new(pool.clone());
    let mismatched: Vec<Invitation> = repo
        .find_status_mismatches()
        .await?
        .into_iter()
        .map(Invitation::from)
        .collect();

    if mismatched.is_empty() {
        println!("All invitation statuses match their usage");
        return Ok(0);
    }

    println!("{} invitation(s) will be updated:", mismatched.len());
    for invitation in &mismatched {
        println!(
            "  {} ({}): {}/{} uses, status {} -> {}",
            invitation.id,
            invitation.invite_code,
            invitation.current_uses,
            invitation.max_uses,
            invitation.status,
            domain::models::InvitationStatus::for_usage(
                invitation.current_uses,
                invitation.max_uses
            )
        );
    }

    if !confirm(assume_yes)? {
        return aborted();
    }

    let changed = repo.sync_status().await?;
    println!("Updated {} invitation(s)", changed);
    Ok(0)
}

/// Issues a new code for an invitation and clears its usage.
pub async fn run_reset_invitation(
    args: &ResetInvitationArgs,
    pool: &PgPool,
    assume_yes: bool,
) -> Result<u8> {
    let repo = InvitationRepository::new(pool.clone());
    let Some(invitation) = repo.find_by_id(args.id).await?.map(Invitation::from) else {
        bail!("invitation {} not found", args.id);
    };

    println!(
        "Invitation {} ({}) for team {}: {}/{} uses, status {}",
        invitation.id,
        invitation.invite_code,
        invitation.group_id,
        invitation.current_uses,
        invitation.max_uses,
        invitation.status
    );
    println!(
        "It will get a new code, zero uses and expire in {} hours",
        DEFAULT_INVITATION_TTL_HOURS
    );

    if !confirm(assume_yes)? {
        return aborted();
    }

    let code = repo
        .generate_unique_code(generate_invite_code)
        .await
        .context("failed to generate an invitation code")?;
    let expires_at = Utc::now() + Duration::hours(DEFAULT_INVITATION_TTL_HOURS);

    let Some(reset) = repo
        .reset_invitation(invitation.id, None, &code, expires_at)
        .await?
    else {
        bail!("invitation {} disappeared during reset", invitation.id);
    };

    println!("New code: {} (expires {})", reset.invite_code, reset.expires_at);
    Ok(0)
}

/// Soft-removes a member acting as the given team leader.
pub async fn run_remove_member(
    args: &RemoveMemberArgs,
    pool: &PgPool,
    assume_yes: bool,
) -> Result<u8> {
    let repo = MemberRepository::new(pool.clone());
    let Some(member) = repo.find_by_id(args.member).await?.map(Member::from) else {
        bail!("member {} not found", args.member);
    };

    println!(
        "Member {} <{}> ({}, {}) will be deactivated in team {}",
        member.name, member.email, member.role, member.status, args.team
    );

    if !confirm(assume_yes)? {
        return aborted();
    }

    let outcome = repo
        .remove_member(args.team, args.operator, args.member)
        .await?;

    if outcome.already_removed {
        println!("Member has already been removed");
    } else {
        println!("Member removed");
    }
    Ok(0)
}

/// Moves a team between lifecycle states.
pub async fn run_set_team_status(
    args: &SetTeamStatusArgs,
    pool: &PgPool,
    assume_yes: bool,
) -> Result<u8> {
    let repo = TeamRepository::new(pool.clone());
    let Some(team) = repo.find_by_id(args.team).await?.map(Team::from) else {
        bail!("team {} not found", args.team);
    };

    if team.status == args.status {
        println!("Team {} is already {}", team.name, team.status);
        return Ok(0);
    }

    println!(
        "Team {} ({}) will change from {} to {}",
        team.name, team.id, team.status, args.status
    );

    if !confirm(assume_yes)? {
        return aborted();
    }

    match repo.set_status(team.id, args.status.into()).await? {
        Some(updated) => {
            println!("Team is now {}", TeamStatus::from(updated.status));
            Ok(0)
        }
        None => bail!("a team whose registration code is unused cannot be activated"),
    }
}
