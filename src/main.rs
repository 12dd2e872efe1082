use std::sync::Arc;

use anyhow::Context;
use book_catalog::modules::{
    self,
    books::{BookRepository, InMemoryBookRepository, MySqlBookRepository},
};
use catalog_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "book-catalog", version, about = "Server-rendered book catalog")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Keep books in process memory instead of MySQL
        #[arg(long)]
        in_memory: bool,
    },
    /// Print the expected `books` table DDL
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve { in_memory: false }) {
        Command::Serve { in_memory } => serve(in_memory).await,
        Command::Schema => {
            print!("{}", catalog_db::SCHEMA);
            Ok(())
        }
    }
}

async fn serve(in_memory: bool) -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load catalog settings")?;
    catalog_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %catalog_db::describe(&settings.database),
        in_memory,
        "book-catalog bootstrap starting"
    );

    let repository: Arc<dyn BookRepository> = if in_memory {
        tracing::warn!("using in-memory storage; books are lost on exit");
        Arc::new(InMemoryBookRepository::new())
    } else {
        let pool = catalog_db::connect(&settings.database).await?;
        Arc::new(MySqlBookRepository::new(pool))
    };

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, repository)?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("book-catalog bootstrap complete");

    let served = catalog_http::start_server(&registry, &settings).await;
    let stopped = registry.stop_all().await;
    shutdown_outcome(served, stopped)
}

/// A server failure outranks a module stop failure; the latter is logged.
fn shutdown_outcome(served: anyhow::Result<()>, stopped: anyhow::Result<()>) -> anyhow::Result<()> {
    match (served, stopped) {
        (Err(served), Err(stopped)) => {
            tracing::error!(error.cause_chain = ?stopped, "failed to stop modules");
            Err(served)
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}
