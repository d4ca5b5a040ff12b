use crate::app_config::AppConfig;
use crate::console::run_console;
use crate::device_registry::DeviceRegistry;
use crate::dispatcher::Dispatcher;
use crate::domain::commands::{Command, Outcome};
use crate::poller::Poller;
use crate::scanner::TcpScanner;
use crate::status_listener::status_listener;
use std::sync::Arc;
use tokio::io::{BufReader, stdin, stdout};
use tokio::task;
use tracing::{error, info, warn};

mod app_config;
mod client;
mod console;
mod device_registry;
mod dispatcher;
mod domain;
mod poller;
mod rts_fetch;
mod scanner;
mod status_listener;
mod validation;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!("✅  Loaded configuration");

    let client = client::new_client(&config)?;
    let registry = DeviceRegistry::new().shared();
    let poller = Poller::new(client.clone(), registry.clone(), config.poller());
    let scanner = Arc::new(TcpScanner::new(
        config.client().scan_connect_timeout(),
        config.poller().max_concurrent_requests(),
    ));
    let dispatcher = Dispatcher::new(registry, client, poller.clone(), scanner);

    let notifier_rx = poller.subscribe();
    task::spawn(async move {
        status_listener(notifier_rx).await;
    });
    info!("✅  Initialized status listener");

    if config.core().scan_on_startup() {
        let scan = Command::ScanNetwork {
            network: config.network().to_string(),
            port: u32::from(config.port()),
        };
        match dispatcher.dispatch(scan).await {
            Ok(Outcome::DevicesDiscovered(devices)) => info!("✅  Discovered {} device(s)", devices.len()),
            Ok(_) => {}
            Err(e) => warn!("⚠️ Network scan failed: {}", e),
        }

        if let Ok(Outcome::RtsList(entries)) = dispatcher.dispatch(Command::ListRts).await {
            info!("✅  Displaying {} rts", entries.len());
        }
    }

    task::spawn(async move {
        if let Err(e) = run_console(&dispatcher, BufReader::new(stdin()), stdout()).await {
            error!("❌ Console stopped: {}", e);
        }
    });
    info!("✅  Listening for commands on stdin");

    let scheduler = poller.start();
    info!("🔥 {} is up and running", env!("CARGO_PKG_NAME"));

    tokio::signal::ctrl_c().await?;
    scheduler.abort();
    info!("👋 Shutting down");

    Ok(())
}
