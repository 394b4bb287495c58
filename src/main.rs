use std::path::PathBuf;

use clap::Parser;

use taskboard_server::ServerConfig;
use taskboard_store::Database;

/// To-do list HTTP service backed by SQLite.
#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about)]
struct Args {
    /// Host to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Path to the SQLite database file.
    #[arg(long, default_value = "taskboard.db")]
    db: PathBuf,

    /// Drop and recreate the task table before serving. Destroys all tasks.
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let db = Database::open(&args.db).expect("Failed to open database");

    if args.reset {
        db.reset().expect("Failed to reset database");
    }

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };

    let handle = taskboard_server::start(config, db)
        .await
        .expect("Failed to start server");

    tracing::info!(port = handle.port, "taskboard ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl+c");

    tracing::info!("Shutting down");
}
