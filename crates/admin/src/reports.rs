//! Read-only reports: `teams`, `members`, `invitations` and `audit`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{Invitation, Member, Team};
use domain::services::{audit_invitation, audit_team, IntegrityIssue};
use persistence::entities::TeamReportEntity;
use persistence::repositories::{InvitationRepository, MemberRepository, TeamRepository};

use crate::{cell, short_id};

/// Arguments for `polify-admin members`.
#[derive(Args, Debug)]
pub struct MembersArgs {
    /// Team to list.
    #[arg(long)]
    pub team: Uuid,

    /// Include removed members.
    #[arg(long)]
    pub include_inactive: bool,
}

/// Arguments for `polify-admin invitations`.
#[derive(Args, Debug)]
pub struct InvitationsArgs {
    /// Restrict the report to one team.
    #[arg(long)]
    pub team: Option<Uuid>,
}

pub async fn run_teams(pool: &PgPool) -> Result<u8> {
    let rows = TeamRepository::new(pool.clone()).report().await?;

    println!(
        "{} {} {} {} {} {} {}",
        cell("ID", 8),
        cell("TEAM", 28),
        cell("STATUS", 8),
        cell("CODE", 9),
        cell("LEADER", 20),
        cell("MEMBERS", 10),
        "INVITES"
    );
    for row in &rows {
        println!("{}", team_line(row));
    }
    println!("{} team(s)", rows.len());
    Ok(0)
}

fn team_line(row: &TeamReportEntity) -> String {
    let code = if row.code_used {
        format!("{}*", row.registration_code)
    } else {
        row.registration_code.clone()
    };
    let members = format!("{}/{}", row.active_member_count, row.inactive_member_count);

    format!(
        "{} {} {} {} {} {} {}",
        short_id(row.id),
        cell(&row.name, 28),
        cell(domain::models::TeamStatus::from(row.status).as_str(), 8),
        cell(&code, 9),
        cell(row.leader_name.as_deref().unwrap_or("-"), 20),
        cell(&members, 10),
        row.invitation_count
    )
}

pub async fn run_members(args: &MembersArgs, pool: &PgPool) -> Result<u8> {
    let members: Vec<Member> = MemberRepository::new(pool.clone())
        .list_for_team(args.team, args.include_inactive)
        .await?
        .into_iter()
        .map(Member::from)
        .collect();

    println!(
        "{} {} {} {} {} {}",
        cell("ID", 8),
        cell("NAME", 24),
        cell("EMAIL", 30),
        cell("ROLE", 7),
        cell("STATUS", 8),
        "JOINED"
    );
    for member in &members {
        println!("{}", member_line(member));
    }
    println!("{} member(s)", members.len());
    Ok(0)
}

fn member_line(member: &Member) -> String {
    format!(
        "{} {} {} {} {} {}",
        short_id(member.id),
        cell(&member.name, 24),
        cell(&member.email, 30),
        cell(member.role.as_str(), 7),
        cell(member.status.as_str(), 8),
        member.created_at.format("%Y-%m-%d")
    )
}

pub async fn run_invitations(args: &InvitationsArgs, pool: &PgPool) -> Result<u8> {
    let invitations: Vec<Invitation> = InvitationRepository::new(pool.clone())
        .list(args.team)
        .await?
        .into_iter()
        .map(Invitation::from)
        .collect();

    let now = Utc::now();
    println!(
        "{} {} {} {} {} {}",
        cell("ID", 8),
        cell("TEAM", 8),
        cell("CODE", 9),
        cell("USES", 7),
        cell("STATE", 10),
        "EXPIRES"
    );
    for invitation in &invitations {
        println!("{}", invitation_line(invitation, now));
    }
    println!("{} invitation(s)", invitations.len());
    Ok(0)
}

fn invitation_line(invitation: &Invitation, now: DateTime<Utc>) -> String {
    let uses = format!("{}/{}", invitation.current_uses, invitation.max_uses);
    format!(
        "{} {} {} {} {} {}",
        short_id(invitation.id),
        short_id(invitation.group_id),
        cell(&invitation.invite_code, 9),
        cell(&uses, 7),
        cell(&invitation.state_at(now).to_string(), 10),
        invitation.expires_at.format("%Y-%m-%d %H:%M")
    )
}

/// Collects every integrity problem across teams and invitations.
pub fn collect_issues(teams: &[(Team, i64)], invitations: &[Invitation]) -> Vec<IntegrityIssue> {
    teams
        .iter()
        .flat_map(|(team, leaders)| audit_team(team, *leaders))
        .chain(invitations.iter().flat_map(audit_invitation))
        .collect()
}

/// Exits with status 1 when any problem is found.
pub async fn run_audit(pool: &PgPool) -> Result<u8> {
    let teams: Vec<(Team, i64)> = TeamRepository::new(pool.clone())
        .list_with_leader_counts()
        .await?
        .into_iter()
        .map(|row| (Team::from(row.team), row.active_leader_count))
        .collect();
    let invitations: Vec<Invitation> = InvitationRepository::new(pool.clone())
        .list(None)
        .await?
        .into_iter()
        .map(Invitation::from)
        .collect();

    let issues = collect_issues(&teams, &invitations);
    println!(
        "Audited {} team(s) and {} invitation(s)",
        teams.len(),
        invitations.len()
    );

    if issues.is_empty() {
        println!("No problems found");
        return Ok(0);
    }

    for issue in &issues {
        println!("  - {}", issue);
    }
    println!("{} problem(s) found", issues.len());
    tracing::warn!(count = issues.len(), "Integrity audit failed");
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::models::{InvitationStatus, MemberRole, MemberStatus, TeamStatus};

    fn team(code_used: bool, leader_id: Option<Uuid>) -> Team {
        let now = Utc::now();
        Team {
            id: Uuid::new_v4(),
            name: "Ward Office".to_string(),
            politician_name: "Jane Doe".to_string(),
            position: "MCA".to_string(),
            county_id: None,
            district_id: None,
            registration_code: "ABCD2345".to_string(),
            status: if code_used {
                TeamStatus::Active
            } else {
                TeamStatus::Pending
            },
            code_used,
            leader_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn invitation(current_uses: i32, max_uses: i32, status: InvitationStatus) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: Uuid::new_v4(),
            invite_code: "WXYZ6789".to_string(),
            group_id: Uuid::new_v4(),
            max_uses,
            current_uses,
            status,
            expires_at: now + Duration::hours(72),
            used_by: None,
            used_at: None,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_collect_issues_clean_data() {
        let teams = vec![(team(true, Some(Uuid::new_v4())), 1), (team(false, None), 0)];
        let invitations = vec![
            invitation(0, 1, InvitationStatus::Active),
            invitation(1, 1, InvitationStatus::Exhausted),
        ];
        assert!(collect_issues(&teams, &invitations).is_empty());
    }

    #[test]
    fn test_collect_issues_reports_each_problem() {
        let teams = vec![(team(true, None), 2)];
        let invitations = vec![invitation(1, 1, InvitationStatus::Active)];

        let issues = collect_issues(&teams, &invitations);
        assert_eq!(issues.len(), 3);
        assert!(issues
            .iter()
            .any(|i| matches!(i, IntegrityIssue::CodeUsedWithoutLeader { .. })));
        assert!(issues
            .iter()
            .any(|i| matches!(i, IntegrityIssue::MultipleActiveLeaders { count: 2, .. })));
        assert!(issues
            .iter()
            .any(|i| matches!(i, IntegrityIssue::StatusMismatch { .. })));
    }

    #[test]
    fn test_invitation_line_shows_derived_state() {
        let mut expired = invitation(0, 3, InvitationStatus::Active);
        expired.expires_at = Utc::now() - Duration::hours(1);

        let line = invitation_line(&expired, Utc::now());
        assert!(line.contains("WXYZ6789"));
        assert!(line.contains("0/3"));
        assert!(line.contains("expired"));
    }

    #[test]
    fn test_member_line() {
        let now = Utc::now();
        let member = Member {
            id: Uuid::new_v4(),
            auth_user_id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            name: "Sam Staff".to_string(),
            email: "sam@example.com".to_string(),
            role: MemberRole::Staff,
            is_leader: false,
            status: MemberStatus::Inactive,
            invitation_id: None,
            created_at: now,
            updated_at: now,
        };

        let line = member_line(&member);
        assert!(line.contains("Sam Staff"));
        assert!(line.contains("staff"));
        assert!(line.contains("inactive"));
    }
}
