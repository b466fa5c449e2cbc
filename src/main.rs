use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardguru::db::{create_pool, CardStore, MemoryCardStore, PgCardStore};
use cardguru::embeddings::{backfill_embeddings, Embedder, HuggingFaceEmbedder};
use cardguru::{config::Config, create_router, seed, AppState};

#[derive(Parser)]
#[command(name = "cardguru", version, about = "Credit card discovery API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Keep the catalog in memory instead of Postgres
        #[arg(long)]
        memory: bool,
        /// Cards to load into the in-memory catalog
        #[arg(long, default_value = "data/cards.json")]
        seed_file: PathBuf,
    },
    /// Import cards from a JSON file into Postgres
    Seed {
        #[arg(default_value = "data/cards.json")]
        path: PathBuf,
        /// Do not generate embeddings after the import
        #[arg(long)]
        skip_embeddings: bool,
    },
    /// Generate embeddings for cards that have none
    Backfill,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardguru=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?} {:?}", config.server, config.embedding);

    let embedder: Arc<dyn Embedder> = Arc::new(HuggingFaceEmbedder::from_config(&config.embedding));
    if config.embedding.api_key.is_empty() {
        warn!("HUGGINGFACE_API_KEY is not set; search and embedding generation will fail");
    }

    match cli.command.unwrap_or(Command::Serve {
        memory: false,
        seed_file: PathBuf::from("data/cards.json"),
    }) {
        Command::Serve { memory, seed_file } => {
            let store: Arc<dyn CardStore> = if memory {
                let store = MemoryCardStore::new();
                let cards = seed::load_cards(&seed_file).await?;
                let report = seed::import_cards(&store, cards).await;
                info!(inserted = report.inserted, failed = report.failed, "In-memory catalog loaded");
                Arc::new(store)
            } else {
                Arc::new(PgCardStore::new(connect(&config).await?))
            };
            serve(AppState { store, embedder, config }).await
        }
        Command::Seed { path, skip_embeddings } => {
            let store = PgCardStore::new(connect(&config).await?);
            let cards = seed::load_cards(&path).await?;
            let report = seed::import_cards(&store, cards).await;
            info!(inserted = report.inserted, failed = report.failed, "Seed import finished");

            if !skip_embeddings {
                let report =
                    backfill_embeddings(&store, embedder.as_ref(), config.embedding.backfill_delay())
                        .await?;
                info!(successful = report.successful, failed = report.failed, "Embeddings generated");
            }
            Ok(())
        }
        Command::Backfill => {
            let store = PgCardStore::new(connect(&config).await?);
            let report =
                backfill_embeddings(&store, embedder.as_ref(), config.embedding.backfill_delay())
                    .await?;
            for error in &report.errors {
                warn!("{}", error);
            }
            info!(
                total = report.total,
                successful = report.successful,
                failed = report.failed,
                "Backfill finished"
            );
            Ok(())
        }
    }
}

/// Connects to Postgres and applies pending migrations.
async fn connect(config: &Config) -> anyhow::Result<sqlx::PgPool> {
    let pool = create_pool(&config.database).await?;

    info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Database migrations completed");

    Ok(pool)
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port)
        .parse()
        .context("HOST/PORT do not form a socket address")?;

    let app = create_router(state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
