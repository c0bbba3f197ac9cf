use anyhow::Context;
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;

use todo_api::{config::AppConfig, db::connection, logging::init_tracing, migration::Migrator};

/// Applies or rolls back schema migrations for the database in `APP_DATABASE__URL`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Apply pending migrations (all of them unless --steps is given)
    Up {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table and re-apply all migrations
    Fresh,
    /// Show which migrations are applied
    Status,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("migration failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging);

    let command = cli.command.unwrap_or(Commands::Up { steps: None });
    let db = connection::connect(&cfg.database).await?;

    tracing::info!(?command, "running migrations");
    match command {
        Commands::Up { steps } => Migrator::up(&db, steps).await?,
        Commands::Down { steps } => Migrator::down(&db, Some(steps)).await?,
        Commands::Fresh => Migrator::fresh(&db).await?,
        Commands::Status => Migrator::status(&db).await?,
    }
    tracing::info!("migrations finished");
    Ok(())
}
