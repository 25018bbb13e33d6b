//! Grants or revokes the `ADMIN` role: `admin grant <email>` / `admin revoke <email>`.

use adevar::{
    config::Config,
    entities::Role,
    repositories::{UserRepository, UserRepositoryTrait},
    telemetry,
};
use anyhow::{Context, bail};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

const USAGE: &str = "usage: admin <grant|revoke> <email>";

fn parse_command(mut args: impl Iterator<Item = String>) -> anyhow::Result<(Role, String)> {
    let role = match args.next().as_deref() {
        Some("grant") => Role::Admin,
        Some("revoke") => Role::User,
        _ => bail!(USAGE),
    };
    let email = args.next().context(USAGE)?;
    if args.next().is_some() {
        bail!(USAGE);
    }
    Ok((role, email))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (role, email) = parse_command(std::env::args().skip(1))?;

    let config = Config::from_env()?;
    telemetry::init(config.log_format());

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(config.database_url())
        .await?;

    if !UserRepository::new(pool).set_role(&email, role).await? {
        bail!("no account registered as {}", email);
    }
    info!(%email, %role, "role updated");

    Ok(())
}
