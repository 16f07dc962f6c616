//! switchyard: run requests through the gateway from stdin.
//!
//! Reads one JSON request per line, handles all of them concurrently,
//! prints one JSON line per outcome (in input order) followed by the
//! metrics report.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

use switchyard::{Config, Gateway};

/// Switchyard: caching, rate-limiting LLM gateway.
#[derive(Parser)]
#[command(name = "switchyard")]
#[command(version)]
#[command(about = "Feed newline-delimited JSON requests through the gateway")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Client identity used for rate limiting.
    #[arg(long, env = "SWITCHYARD_CLIENT", default_value = "stdin")]
    client: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let gateway = Arc::new(Gateway::from_config(&config)?);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        providers = ?gateway.providers().ids(),
        "switchyard ready"
    );

    // Ctrl-C abandons in-flight provider calls; they report as cancelled.
    let shutdown = CancellationToken::new();
    let on_interrupt = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut handles = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let gateway = Arc::clone(&gateway);
        let client = args.client.clone();
        let cancel = shutdown.child_token();
        handles.push(tokio::spawn(async move {
            match gateway.handle_payload(&client, line.as_bytes(), &cancel).await {
                Ok(response) => serde_json::to_string(&response),
                Err(e) => serde_json::to_string(&e.payload()),
            }
        }));
    }

    for handle in handles {
        println!("{}", handle.await??);
    }
    println!("{}", serde_json::to_string(&gateway.metrics_report())?);

    Ok(())
}
