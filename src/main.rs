//! Handler data API server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Delegating component ──add/remove──▶ HandlerRegistry ◀──get──┐
//!          │                                                      │
//!          │ spawns, passes handler id                            │
//!          ▼                                                      │
//!   External process ──GET/PUT /handlers/{id}/...──▶ DataServer ──┤
//!                                                     │           │
//!                                             ResourceRouter      │
//!                                                     │           │
//!                                            read.rs / write.rs ──┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use handler_data_api::config::loader::load_or_default;
use handler_data_api::observability::{logging, metrics};
use handler_data_api::{DataServer, HandlerRegistry, Shutdown};

#[derive(Parser)]
#[command(name = "handler-data-api")]
#[command(about = "Data API through which external processes handle HTTP requests", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("handler-data-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_body_size = config.intake.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = DataServer::new(HandlerRegistry::new())?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
