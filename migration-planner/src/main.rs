use anyhow::Context;
use clap::Parser;
use migration_planner::cli::Args;
use migration_planner::planner::run_workflow;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    migration_planner_sdk::set_event_output(args.events);

    let config = args.load_config().context("Failed to load configuration")?;

    let report = run_workflow(&config)
        .await
        .with_context(|| format!("Migration planning failed for '{}'", config.input_project))?;

    let migrated: usize = report.migrated_files.values().map(Vec::len).sum();
    tracing::info!(
        collections = report.mongo_db_schemas.len(),
        migrated_files = migrated,
        steps = report.plan.implementation_steps.len(),
        "Migration plan written to {}",
        config.output_path.display()
    );
    Ok(())
}
