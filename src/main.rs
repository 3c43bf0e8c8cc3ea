use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notemark::{api, config::AppConfig, db::Database, AppState};

#[derive(Parser)]
#[command(name = "notemark")]
#[command(about = "Personal notes and bookmarks server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the notemark server
    Serve {
        /// Port for the HTTP API
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Database file path (defaults to the platform data directory)
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "notemark=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let (port, database) = match cli.command {
        Some(Commands::Serve { port, database }) => (port, database),
        None => (5000, None),
    };

    serve(port, database).await
}

async fn serve(port: u16, database: Option<PathBuf>) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let db = match database {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;

    let app = api::create_router(AppState::new(db, &config));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("notemark server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
