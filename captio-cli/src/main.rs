//! Captio terminal host.
//!
//! Wires stub recognition/translation backends into the engine and prints
//! every caption event to stdout. Real backends implement the
//! `SpeechRecognizer`/`Translator` traits and drop in here without touching
//! the engine.

mod settings;

use std::path::PathBuf;

use anyhow::Context;
use captio_core::inference::stub::{StubRecognizer, StubTranslator};
use captio_core::{
    CaptionEngine, CaptionUpdate, CaptioError, RecognizerHandle, TranslatorHandle,
};
use settings::load_settings;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SETTINGS_FILE: &str = "captio.json";

fn settings_path() -> PathBuf {
    std::env::var_os("CAPTIO_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings(&settings_path());
    info!(?settings, "loaded settings");

    let engine = CaptionEngine::new(
        settings.to_config(),
        RecognizerHandle::new(StubRecognizer::new()),
        TranslatorHandle::new(StubTranslator::new()),
    );

    engine.warm_up().context("backend warm-up failed")?;

    let mut captions = engine.subscribe_captions();
    let mut statuses = engine.subscribe_status();

    if let Err(e) = engine.start() {
        if matches!(e, CaptioError::MonitorDeviceNotFound) {
            eprintln!(
                "No monitor (loopback) input device found. Enable a playback \
                 monitor (e.g. PulseAudio/PipeWire \"Monitor of …\") and retry."
            );
        }
        return Err(e).context("engine start failed");
    }

    info!("captioning — press Ctrl-C to stop");
    loop {
        tokio::select! {
            event = captions.recv() => match event {
                Ok(event) => match event.update {
                    CaptionUpdate::Caption { original, translated } => {
                        println!("{original}");
                        println!("  ↳ {translated}");
                    }
                    CaptionUpdate::Error { message } => {
                        println!("[error] {message}");
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "display fell behind; captions dropped");
                }
                Err(RecvError::Closed) => break,
            },
            status = statuses.recv() => {
                if let Ok(status) = status {
                    info!(status = ?status.status, detail = ?status.detail, "engine status");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stop requested");
                break;
            }
        }
    }

    // Stop may race a natural shutdown; NotRunning is fine here.
    match engine.stop() {
        Ok(()) | Err(CaptioError::NotRunning) => {}
        Err(e) => return Err(e).context("engine stop failed"),
    }

    let snap = engine.diagnostics_snapshot();
    info!(
        windows = snap.windows_extracted,
        captions = snap.captions_emitted,
        errors = snap.error_captions_emitted,
        "session summary"
    );
    Ok(())
}
