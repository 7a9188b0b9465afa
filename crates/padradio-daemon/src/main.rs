mod core;
mod dispatch;
mod gamepad;
mod mixer;
mod network;
mod playback;
mod player;
mod process;
mod speech;
mod system;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use padradio_proto::bookmarks::BookmarkStore;
use padradio_proto::catalog::StationCatalog;
use padradio_proto::config::Config;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::core::{RadioCore, RadioEvent};
use crate::dispatch::{DispatchSettings, InputDispatcher};
use crate::mixer::VolumeControl;
use crate::playback::PlaybackController;
use crate::player::FfplayLauncher;
use crate::speech::Speaker;
use crate::system::SystemOps;

/// Gamepad-controlled internet radio.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Config file (default: ~/.config/padradio/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// evdev device to read instead of auto-detecting the pad
    #[arg(long)]
    device: Option<PathBuf>,
    /// Enable Select-held admin actions regardless of the config
    #[arg(long)]
    admin: bool,
    /// Skip waiting for network connectivity on startup
    #[arg(long)]
    no_network_wait: bool,
}

fn init_logging() -> anyhow::Result<PathBuf> {
    let data_dir = padradio_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("padradio.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // File for post-mortems, stderr for journald when run as a service.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,padradio=debug")),
        )
        .init();

    Ok(log_path)
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate => {}
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_path = init_logging()?;
    info!("padradio {} starting", env!("CARGO_PKG_VERSION"));
    info!("Log file: {:?}", log_path);

    let config_path = args.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path)?;
    info!("Config loaded from: {:?}", config_path);
    if args.device.is_some() {
        config.input.device = args.device.clone();
    }
    if args.admin {
        config.admin.enabled = true;
    }
    if args.no_network_wait {
        config.network.wait_on_startup = false;
    }

    if config.network.wait_on_startup {
        tokio::select! {
            _ = network::wait_until_online(&config.network) => {}
            _ = shutdown_signal() => {
                info!("Shutdown requested while waiting for network");
                return Ok(());
            }
        }
    }

    let catalog = StationCatalog::load(&config.stations.custom_file, &config.stations.default_file);
    if catalog.is_empty() {
        error!("No stations available to play!");
        anyhow::bail!(
            "no stations found in {:?} or {:?}",
            config.stations.custom_file,
            config.stations.default_file
        );
    }
    info!("Total stations loaded: {}", catalog.len());
    debug!("Stations: {}", catalog.names().collect::<Vec<_>>().join(", "));

    let device = gamepad::open_device(config.input.device.as_deref())?;

    let speaker = Speaker::new(&config.speech);
    let playback = PlaybackController::new(
        Arc::new(catalog),
        FfplayLauncher::locate(&config.player),
        config.player.stop_timeout(),
        speaker.clone(),
    );
    let dispatcher = InputDispatcher::new(DispatchSettings::from_config(
        &config.input,
        config.admin.enabled,
    ));
    if config.admin.enabled {
        info!("Admin mode enabled (hold Select + stick)");
    }

    let mut radio = RadioCore::new(
        dispatcher,
        playback,
        VolumeControl::new(&config.mixer),
        BookmarkStore::open(config.bookmarks.file.clone()),
        SystemOps::new(&config.admin, speaker.clone()),
        speaker,
    );

    // All external inputs funnel into RadioCore through this channel
    let (event_tx, event_rx) = mpsc::channel::<RadioEvent>(256);

    let _reader = gamepad::spawn_reader(device, event_tx.clone())?;

    let signal_tx = event_tx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = signal_tx.send(RadioEvent::Shutdown).await;
    });
    drop(event_tx);

    radio.start_initial().await;
    info!("padradio ready, listening for gamepad input...");
    radio.run(event_rx).await?;

    info!("padradio stopped");
    Ok(())
}
