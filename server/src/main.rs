use clap::Parser;
use log::{error, info, warn};
use serde_json::{Map, Value};
use server::network::{BoxError, Server};
use shared::GameConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Authoritative voxel territory server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address to bind to
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Server port to listen on
    #[clap(short, long, default_value = "8080")]
    port: u16,
    /// Maximum number of concurrent connections
    #[clap(short, long, default_value = "64")]
    max_clients: usize,
    /// How often the income timer runs, in milliseconds
    #[clap(long, default_value = "1000")]
    income_tick_ms: u64,
    /// JSON file with ruleset overrides, merged over the defaults
    #[clap(short, long)]
    rules: Option<PathBuf>,
}

/// Reads a partial ruleset and merges it the same way the admin command does.
fn load_rules(path: &Path) -> Result<GameConfig, BoxError> {
    let text = std::fs::read_to_string(path)?;
    let patch: Map<String, Value> = serde_json::from_str(&text)?;

    let mut config = GameConfig::default();
    let outcome = config.apply_patch(&patch);
    info!(
        "Loaded {} rule overrides from {}",
        outcome.applied.len(),
        path.display()
    );
    if !outcome.skipped.is_empty() {
        warn!("Ignored mistyped rules: {}", outcome.skipped.join(", "));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = match &args.rules {
        Some(path) => load_rules(path)?,
        None => GameConfig::default(),
    };

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::new(
        &address,
        config,
        args.max_clients,
        Duration::from_millis(args.income_tick_ms.max(1)),
    )
    .await?;

    let server_handle = tokio::spawn(server.run());

    tokio::select! {
        result = server_handle => {
            match result {
                Ok(Ok(())) => info!("Server stopped"),
                Ok(Err(e)) => error!("Server failed: {}", e),
                Err(e) => error!("Server task panicked: {}", e),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
