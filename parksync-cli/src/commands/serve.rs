//! `parksync serve`: run the HTTP API until Ctrl+C.

use std::net::SocketAddr;

use clap::Args;
use parksync::api;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (defaults to server.bind from config)
    #[arg(long)]
    pub bind: Option<String>,

    /// Start a refresh sweep as soon as the server is up
    #[arg(long)]
    pub sweep: bool,
}

pub fn run(args: ServeArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("serve");

    let bind = args
        .bind
        .unwrap_or_else(|| runner.config().server.bind.clone());
    let addr: SocketAddr = bind
        .parse()
        .map_err(|_| CliError::Config(format!("invalid bind address '{}'", bind)))?;

    let app = runner.start_app()?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping server...");
        signal.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    runner.block_on(async {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Serve(format!("failed to bind {}: {}", addr, e)))?;

        println!("ParkSync v{}", parksync::VERSION);
        println!("Listening on http://{}", addr);
        println!("Parks:      {}", app.catalog().len());
        println!("Cache:      {}", app.cache().backend_name());
        println!();
        println!("Press Ctrl+C to stop");

        if args.sweep {
            let handle = app.controller().start();
            info!(sweep_id = handle.sweep_id(), "Sweep started at launch");
        }

        let result = api::serve(listener, app.clone(), shutdown.cancelled_owned()).await;
        app.shutdown().await;
        result.map_err(|e| CliError::Serve(e.to_string()))
    })?;

    println!("Server stopped.");
    Ok(())
}
