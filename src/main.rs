//! Credit score pipeline - main entry point

use clap::Parser;
use credit_score::cli::{cmd_import, cmd_serve, cmd_train, Cli, Commands};
use credit_score::training::TrainingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_score=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import { csv, database_url, table } => {
            cmd_import(csv, database_url, table).await?;
        }
        Commands::Train {
            database_url,
            table,
            models_dir,
            target,
            n_estimators,
            n_neighbors,
            seed,
        } => {
            let training = TrainingConfig::new()
                .with_target(target)
                .with_n_estimators(n_estimators)
                .with_n_neighbors(n_neighbors)
                .with_random_state(seed);
            cmd_train(database_url, table, models_dir, training).await?;
        }
        Commands::Serve { port, host, models_dir } => {
            cmd_serve(host, port, models_dir).await?;
        }
    }

    Ok(())
}
