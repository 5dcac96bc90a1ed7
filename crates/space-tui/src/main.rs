mod action;
mod app;
mod mpv;
mod page;
mod pages;
mod theme;
mod widgets;

use std::time::Duration;

use tokio::sync::mpsc;

use space_core::catalog::CatalogClient;
use space_core::config::Config;
use space_core::platform;
use space_core::playback::{AmbientPlayback, SilentOutput};
use space_core::store::{JsonFileStore, MemoryStore, SelectionStore};
use space_core::AmbientSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    let data_dir_ok = match std::fs::create_dir_all(&data_dir) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("safe-space: cannot create {}: {}", data_dir.display(), e);
            false
        }
    };

    let log_path = if data_dir_ok {
        data_dir.join("safe-space.log")
    } else {
        platform::temp_dir().join("safe-space.log")
    };
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep connection-level DEBUG from the HTTP
    // client internals out of the log.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("safe-space log: {}", log_path.display());
    tracing::info!("safe-space starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config: {}; using defaults", e);
        Config::default()
    });

    // ── Durable store ────────────────────────────────────────────────────────
    let store = if data_dir_ok {
        SelectionStore::new(JsonFileStore::open(&config.storage.file))
    } else {
        tracing::warn!("store: data directory unavailable, selections last this run only");
        SelectionStore::new(MemoryStore::new())
    };

    // ── Audio output ─────────────────────────────────────────────────────────
    let (playback, audio_task) = match platform::find_mpv_binary() {
        Some(bin) => {
            tracing::info!("audio: using {}", bin.display());
            let (output, task) = mpv::MpvOutput::spawn(bin, config.playback.mpv_volume());
            (AmbientPlayback::new(output), Some(task))
        }
        None => {
            tracing::warn!("audio: mpv not found, background sounds are disabled");
            (
                AmbientPlayback::new(SilentOutput::new("mpv not found")),
                None,
            )
        }
    };

    let session = AmbientSession::new(store, playback);
    let catalog = CatalogClient::new(config.providers.clone());

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let (tx, rx) = mpsc::channel::<app::AppMessage>(256);
    let app = app::App::new(session, catalog, config.search.clone(), tx);
    let result = app.run(rx).await;

    // The session (and with it the audio output) is gone; let mpv shut down.
    if let Some(task) = audio_task {
        if tokio::time::timeout(Duration::from_secs(2), task).await.is_err() {
            tracing::warn!("audio: player did not shut down in time");
        }
    }

    result
}
