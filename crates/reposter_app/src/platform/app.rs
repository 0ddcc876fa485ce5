use std::fs;
use std::io;

use engine_logging::{engine_error, engine_info, engine_warn};
use reposter_engine::{
    Automation, CdpView, Control, EngineSettings, LiveView, SnapshotView, ViewError,
};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::control::parse_line;
use super::logging;
use super::options::{Options, OptionsError};
use super::persistence::{SettingsStore, StoredSettings};

/// Location reported by the snapshot view; a search page is a supported view.
const SNAPSHOT_LOCATION: &str = "https://x.com/search";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error("failed to start the runtime: {0}")]
    Runtime(io::Error),
    #[error("failed to read snapshot {path}: {source}")]
    Snapshot { path: String, source: io::Error },
    #[error(transparent)]
    View(#[from] ViewError),
}

pub fn run_app() -> Result<(), AppError> {
    let options = Options::parse(std::env::args().skip(1))?;
    logging::initialize(options.log_destination, &options.log_file);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;
    let result = runtime.block_on(run(options));
    if let Err(err) = &result {
        engine_error!("{}", err);
    }
    result
}

async fn run(options: Options) -> Result<(), AppError> {
    let store = SettingsStore::new(options.settings_path.clone());
    let settings = store.load();

    match &options.snapshot {
        Some(path) => {
            let html = fs::read_to_string(path).map_err(|source| AppError::Snapshot {
                path: path.display().to_string(),
                source,
            })?;
            engine_info!("Driving snapshot {:?}", path);
            drive(SnapshotView::new(SNAPSHOT_LOCATION, html), store, settings).await
        }
        None => {
            let view = CdpView::connect(&settings.cdp_endpoint, &settings.target_url_contains).await?;
            drive(view, store, settings).await
        }
    }
}

async fn drive<V: LiveView>(
    view: V,
    store: SettingsStore,
    settings: StoredSettings,
) -> Result<(), AppError> {
    let engine_settings = EngineSettings::default();
    let restart_settle = engine_settings.timings.restart_settle;
    let mut automation = Automation::new(view, settings.configuration(), engine_settings)?;
    if settings.is_running {
        engine_info!("Run was active at shutdown, resuming");
        automation.schedule_start(restart_settle);
    }

    let shutdown = CancellationToken::new();
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    tokio::spawn(read_control_lines(store, settings, control_tx, shutdown.clone()));

    let interrupt = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => engine_info!("Interrupt received"),
            Err(err) => engine_warn!("Listening for interrupts failed: {}", err),
        }
        interrupt.cancel();
    });

    automation.run(control_rx, shutdown).await;
    Ok(())
}

/// Forwards stdin control lines to the scheduler, persisting the settings
/// each one changes. End of input leaves the scheduler running.
async fn read_control_lines(
    store: SettingsStore,
    mut settings: StoredSettings,
    control_tx: mpsc::UnboundedSender<Control>,
    shutdown: CancellationToken,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => return,
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                engine_info!("Control input closed");
                break;
            }
            Err(err) => {
                engine_error!("Reading control input failed: {}", err);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let message = match parse_line(&line) {
            Ok(message) => message,
            Err(err) => {
                engine_warn!("Ignoring control line: {}", err);
                continue;
            }
        };
        let Some(control) = message.apply(&mut settings) else {
            continue;
        };
        if let Err(err) = store.save(&settings) {
            engine_error!("Failed to save settings to {:?}: {}", store.path(), err);
        }
        if control_tx.send(control).is_err() {
            return;
        }
    }
    // Keep the channel open so the scheduler runs until shutdown.
    shutdown.cancelled().await;
}
