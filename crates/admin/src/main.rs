//! # polify-admin entry point
//!
//! Parses command-line arguments, connects to PostgreSQL and dispatches to
//! the subcommand handlers.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use persistence::db::{create_pool, DatabaseConfig};
use polify_admin::repair::{
    run_remove_member, run_repair_invitation_usage, run_reset_invitation, run_set_team_status,
    run_sync_invitation_status, RemoveMemberArgs, ResetInvitationArgs, SetTeamStatusArgs,
};
use polify_admin::reports::{
    run_audit, run_invitations, run_members, run_teams, InvitationsArgs, MembersArgs,
};
use polify_admin::teams::{run_create_team, CreateTeamArgs};

/// Polify administration tool
#[derive(Parser, Debug)]
#[command(name = "polify-admin", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    /// Answer yes to every confirmation prompt.
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a pending team and print its registration code.
    CreateTeam(CreateTeamArgs),

    /// Report all teams with leader, member and invitation counts.
    Teams,

    /// Report a team's roster.
    Members(MembersArgs),

    /// Report invitations with their derived state.
    Invitations(InvitationsArgs),

    /// Check team and invitation invariants; exits 1 when problems are found.
    Audit,

    /// Count a use on invitations that record a redeemer but zero uses.
    RepairInvitationUsage,

    /// Recompute invitation status from usage counters.
    SyncInvitationStatus,

    /// Give an invitation a new code and clear its usage.
    ResetInvitation(ResetInvitationArgs),

    /// Deactivate a member on behalf of the team leader.
    RemoveMember(RemoveMemberArgs),

    /// Change a team's lifecycle status.
    SetTeamStatus(SetTeamStatusArgs),
}

fn database_url(cli: &Cli) -> Result<String> {
    cli.database_url
        .clone()
        .or_else(|| std::env::var("POLIFY__DATABASE__URL").ok())
        .filter(|url| !url.trim().is_empty())
        .context("DATABASE_URL (or POLIFY__DATABASE__URL) must be set")
}

async fn run(cli: Cli) -> Result<u8> {
    let config = DatabaseConfig {
        url: database_url(&cli)?,
        max_connections: 2,
        min_connections: 1,
        connect_timeout_secs: 10,
        idle_timeout_secs: 60,
    };
    let pool = create_pool(&config)
        .await
        .context("failed to connect to the database")?;

    let yes = cli.yes;
    match cli.command {
        Commands::CreateTeam(args) => run_create_team(&args, &pool).await,
        Commands::Teams => run_teams(&pool).await,
        Commands::Members(args) => run_members(&args, &pool).await,
        Commands::Invitations(args) => run_invitations(&args, &pool).await,
        Commands::Audit => run_audit(&pool).await,
        Commands::RepairInvitationUsage => run_repair_invitation_usage(&pool, yes).await,
        Commands::SyncInvitationStatus => run_sync_invitation_status(&pool, yes).await,
        Commands::ResetInvitation(args) => run_reset_invitation(&args, &pool, yes).await,
        Commands::RemoveMember(args) => run_remove_member(&args, &pool, yes).await,
        Commands::SetTeamStatus(args) => run_set_team_status(&args, &pool, yes).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::TeamStatus;
    use uuid::Uuid;

    #[test]
    fn cli_parse_create_team() {
        let cli = Cli::try_parse_from([
            "polify-admin",
            "--database-url",
            "postgres://localhost/polify",
            "create-team",
            "--name",
            "Ward Office",
            "--politician",
            "Jane Doe",
            "--position",
            "MCA",
        ])
        .unwrap();

        if let Commands::CreateTeam(args) = cli.command {
            assert_eq!(args.name, "Ward Office");
            assert!(args.county_id.is_none());
        } else {
            panic!("expected create-team");
        }
    }

    #[test]
    fn cli_parse_members_include_inactive() {
        let team = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "polify-admin",
            "members",
            "--team",
            &team.to_string(),
            "--include-inactive",
        ])
        .unwrap();

        if let Commands::Members(args) = cli.command {
            assert_eq!(args.team, team);
            assert!(args.include_inactive);
        } else {
            panic!("expected members");
        }
    }

    #[test]
    fn cli_parse_set_team_status() {
        let team = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "polify-admin",
            "-y",
            "set-team-status",
            "--team",
            &team.to_string(),
            "--status",
            "inactive",
        ])
        .unwrap();

        assert!(cli.yes);
        if let Commands::SetTeamStatus(args) = cli.command {
            assert_eq!(args.status, TeamStatus::Inactive);
        } else {
            panic!("expected set-team-status");
        }
    }

    #[test]
    fn cli_rejects_unknown_status() {
        let result = Cli::try_parse_from([
            "polify-admin",
            "set-team-status",
            "--team",
            &Uuid::new_v4().to_string(),
            "--status",
            "archived",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_remove_member_requires_operator() {
        let result = Cli::try_parse_from([
            "polify-admin",
            "remove-member",
            "--team",
            &Uuid::new_v4().to_string(),
            "--member",
            &Uuid::new_v4().to_string(),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_verbose_count() {
        let cli = Cli::try_parse_from(["polify-admin", "-vv", "audit"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Audit));
    }
}
