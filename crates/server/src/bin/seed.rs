use db::seed::{DEFAULT_SEED_PROJECT, seed_demo_issues};
use issue_tracker::{Deployment, config::ServerConfig, logging};

/// Inserts the demo issues into the project named by the first argument.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    let project = std::env::args()
        .nth(1)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SEED_PROJECT.to_string());

    let config = ServerConfig::from_env()?;
    let deployment = Deployment::new(&config).await?;

    let report = seed_demo_issues(deployment.issues().as_ref(), &project).await?;
    tracing::info!(
        project = %project,
        created = report.created,
        skipped = report.skipped,
        "Seeding complete"
    );

    deployment.db().clone().close().await?;
    Ok(())
}
