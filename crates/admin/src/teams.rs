//! `create-team`: registers a pending team.

use anyhow::{Context, Result};
use clap::Args;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::team::generate_registration_code;
use persistence::repositories::TeamRepository;

/// Arguments for `polify-admin create-team`.
#[derive(Args, Debug)]
pub struct CreateTeamArgs {
    /// Team (office) name.
    #[arg(long)]
    pub name: String,

    /// Name of the politician the office serves.
    #[arg(long)]
    pub politician: String,

    /// Elected position, e.g. "Member of County Assembly".
    #[arg(long)]
    pub position: String,

    #[arg(long)]
    pub county_id: Option<Uuid>,

    #[arg(long)]
    pub district_id: Option<Uuid>,
}

/// Inserts the team and prints the registration code to hand to its leader.
pub async fn run_create_team(args: &CreateTeamArgs, pool: &PgPool) -> Result<u8> {
    let name = args.name.trim();
    let politician = args.politician.trim();
    let position = args.position.trim();
    if name.is_empty() || politician.is_empty() || position.is_empty() {
        anyhow::bail!("--name, --politician and --position must not be blank");
    }

    let repo = TeamRepository::new(pool.clone());
    let code = repo
        .generate_unique_code(generate_registration_code)
        .await
        .context("failed to generate a registration code")?;

    let team = repo
        .create_team(
            name,
            politician,
            position,
            args.county_id,
            args.district_id,
            &code,
        )
        .await
        .context("failed to create team")?;

    tracing::info!(team_id = %team.id, "Team created");
    println!("Created team {} ({})", team.name, team.id);
    println!("Registration code: {}", team.registration_code);
    Ok(0)
}
