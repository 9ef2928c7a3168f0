//! `CaptionEngine` — top-level lifecycle controller.
//!
//! ## Lifecycle
//!
//! ```text
//! CaptionEngine::new()
//!     └─► warm_up()          → backends loaded, status = WarmingUp → Idle
//!         └─► start()        → monitor opened, scheduler spawned, status = Listening
//!             └─► stop()     → running=false, stream dropped, status = Stopped
//! ```
//!
//! `start()`/`stop()` are idempotent: calling them in the wrong state
//! returns an error rather than panicking.
//!
//! ## Threading
//!
//! Three threads of execution cooperate: the OS audio callback (appends to
//! the accumulator and returns), the scheduler worker (sleep/poll loop,
//! blocks on inference), and whatever thread consumes the caption events.
//! `cpal::Stream` is `!Send` on Windows/macOS, so `AudioCapture` is created
//! *inside* the `spawn_blocking` closure and never crosses a thread
//! boundary. A sync mpsc channel propagates any open-device error back to
//! the `start()` caller — `MonitorDeviceNotFound` aborts `start()` before
//! the scheduler does any work.

pub mod scheduler;

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::info;

use crate::{
    audio::AudioCapture,
    buffering::ChunkAccumulator,
    error::{CaptioError, Result},
    events::{CaptionEvent, EngineStatus, EngineStatusEvent},
    inference::{RecognizerHandle, TranslatorHandle},
    sink::BroadcastSink,
};

/// Broadcast channel capacity: 256 events buffered for slow consumers.
const BROADCAST_CAP: usize = 256;

/// Configuration for `CaptionEngine`.
#[derive(Debug, Clone)]
pub struct CaptionConfig {
    /// Capture sample rate in Hz. Default: 16000.
    pub sample_rate: u32,
    /// Frames per audio callback requested from the device. Default: 1024.
    pub block_size: usize,
    /// Window duration submitted to the recognizer, in seconds. Default: 2.0.
    pub window_secs: f64,
    /// Scheduler poll interval in milliseconds. Default: 500.
    pub poll_interval_ms: u64,
}

impl CaptionConfig {
    /// Samples per inference window (`sample_rate × window_secs`).
    pub fn window_samples(&self) -> usize {
        (self.sample_rate as f64 * self.window_secs).round() as usize
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            block_size: 1_024,
            window_secs: 2.0,
            poll_interval_ms: 500,
        }
    }
}

/// The top-level engine handle.
///
/// `CaptionEngine` is `Send + Sync` — all fields use interior mutability.
/// Wrap in `Arc<CaptionEngine>` to share between the host's state and
/// event-forwarding tasks.
pub struct CaptionEngine {
    config: CaptionConfig,
    recognizer: RecognizerHandle,
    translator: TranslatorHandle,
    /// `true` while capture + scheduler are active.
    running: Arc<AtomicBool>,
    /// Canonical status (written atomically via Mutex, read from hosts).
    status: Arc<Mutex<EngineStatus>>,
    /// Broadcast sender for caption events.
    caption_tx: broadcast::Sender<CaptionEvent>,
    /// Broadcast sender for status events.
    status_tx: broadcast::Sender<EngineStatusEvent>,
    /// Monotonically increasing caption sequence counter.
    seq: Arc<AtomicU64>,
    /// Shared scheduler diagnostics counters.
    diagnostics: Arc<scheduler::SchedulerDiagnostics>,
}

impl CaptionEngine {
    /// Create a new engine. Does not start capturing — call `warm_up()`
    /// then `start()`.
    pub fn new(
        config: CaptionConfig,
        recognizer: RecognizerHandle,
        translator: TranslatorHandle,
    ) -> Self {
        let (caption_tx, _) = broadcast::channel(BROADCAST_CAP);
        let (status_tx, _) = broadcast::channel(BROADCAST_CAP);

        Self {
            config,
            recognizer,
            translator,
            running: Arc::new(AtomicBool::new(false)),
            status: Arc::new(Mutex::new(EngineStatus::Idle)),
            caption_tx,
            status_tx,
            seq: Arc::new(AtomicU64::new(0)),
            diagnostics: Arc::new(scheduler::SchedulerDiagnostics::default()),
        }
    }

    /// Warm up both backends (load weights, run dummy inference).
    ///
    /// Call once at application startup, before `start()`.
    pub fn warm_up(&self) -> Result<()> {
        self.set_status(EngineStatus::WarmingUp, None);
        info!("warming up recognition and translation backends");
        self.recognizer.0.lock().warm_up()?;
        self.translator.0.lock().warm_up()?;
        self.set_status(EngineStatus::Idle, None);
        info!("backends ready");
        Ok(())
    }

    /// Start monitor capture and the scheduler.
    ///
    /// Blocks until the monitor device is confirmed open (or fails), then
    /// returns. The scheduler continues running in a background blocking
    /// thread.
    ///
    /// # Errors
    /// - `CaptioError::AlreadyRunning` if already started.
    /// - `CaptioError::MonitorDeviceNotFound` when no monitor device exists;
    ///   no scheduler thread polls in that case.
    /// - `CaptioError::AudioStream` on stream setup failure.
    pub fn start(&self) -> Result<()> {
        // Single-winner guard: a concurrent start() must not slip past a
        // load-then-store check.
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CaptioError::AlreadyRunning);
        }

        self.diagnostics.reset();

        let accumulator = ChunkAccumulator::new();

        // Clone all Arc-wrapped state before moving into the closure.
        let config = self.config.clone();
        let recognizer = self.recognizer.clone();
        let translator = self.translator.clone();
        let running = Arc::clone(&self.running);
        let sink = Arc::new(BroadcastSink::new(self.caption_tx.clone()));
        let seq = Arc::clone(&self.seq);
        let diagnostics = Arc::clone(&self.diagnostics);

        // Sync oneshot: scheduler thread signals open success/failure to start().
        let (open_tx, open_rx) = std::sync::mpsc::channel::<Result<()>>();

        tokio::task::spawn_blocking(move || {
            // Open the monitor device on THIS thread — cpal::Stream is !Send.
            let capture = match AudioCapture::open_monitor(
                accumulator.clone(),
                Arc::clone(&running),
                &config,
            ) {
                Ok(c) => {
                    let _ = open_tx.send(Ok(()));
                    c
                }
                Err(e) => {
                    let _ = open_tx.send(Err(e));
                    running.store(false, Ordering::SeqCst);
                    return;
                }
            };

            scheduler::run(scheduler::SchedulerContext {
                config,
                accumulator,
                recognizer,
                translator,
                sink,
                running,
                seq,
                diagnostics,
            });

            // Silence the callback before the stream is torn down, then
            // release the device on this thread.
            capture.stop();
            drop(capture);
        });

        // Block start() until device open is confirmed.
        match open_rx.recv() {
            Ok(Ok(())) => {
                self.set_status(EngineStatus::Listening, None);
                info!("engine started — captioning system audio");
                Ok(())
            }
            Ok(Err(e)) => {
                self.running.store(false, Ordering::SeqCst);
                self.set_status(EngineStatus::Error, Some(e.to_string()));
                Err(e)
            }
            Err(_) => {
                // Channel closed before a message was sent — spawn_blocking panicked?
                self.running.store(false, Ordering::SeqCst);
                self.set_status(EngineStatus::Error, Some("scheduler failed to start".into()));
                Err(CaptioError::Other(anyhow::anyhow!(
                    "scheduler task died unexpectedly"
                )))
            }
        }
    }

    /// Stop capture and the scheduler.
    ///
    /// # Errors
    /// - `CaptioError::NotRunning` if not currently running.
    pub fn stop(&self) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(CaptioError::NotRunning);
        }

        self.running.store(false, Ordering::SeqCst);
        self.set_status(EngineStatus::Stopped, None);
        info!("engine stop requested");
        Ok(())
    }

    /// Current engine status (snapshot).
    pub fn status(&self) -> EngineStatus {
        *self.status.lock()
    }

    /// Subscribe to live caption events.
    pub fn subscribe_captions(&self) -> broadcast::Receiver<CaptionEvent> {
        self.caption_tx.subscribe()
    }

    /// Subscribe to live status change events.
    pub fn subscribe_status(&self) -> broadcast::Receiver<EngineStatusEvent> {
        self.status_tx.subscribe()
    }

    /// Snapshot of scheduler counters for observability.
    pub fn diagnostics_snapshot(&self) -> scheduler::DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn set_status(&self, new_status: EngineStatus, detail: Option<String>) {
        *self.status.lock() = new_status;
        let _ = self.status_tx.send(EngineStatusEvent {
            status: new_status,
            detail,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_boundary() {
        let config = CaptionConfig::default();
        assert_eq!(config.sample_rate, 16_000);
        assert_eq!(config.block_size, 1_024);
        assert_eq!(config.poll_interval_ms, 500);
        // 2 s at 16 kHz → 32 000 samples per window.
        assert_eq!(config.window_samples(), 32_000);
    }

    #[test]
    fn stop_before_start_is_rejected() {
        use crate::inference::stub::{StubRecognizer, StubTranslator};

        let engine = CaptionEngine::new(
            CaptionConfig::default(),
            RecognizerHandle::new(StubRecognizer::new()),
            TranslatorHandle::new(StubTranslator::new()),
        );
        assert!(matches!(engine.stop(), Err(CaptioError::NotRunning)));
        assert_eq!(engine.status(), EngineStatus::Idle);
    }

    #[test]
    fn start_while_running_is_rejected() {
        use crate::inference::stub::{StubRecognizer, StubTranslator};

        let engine = CaptionEngine::new(
            CaptionConfig::default(),
            RecognizerHandle::new(StubRecognizer::new()),
            TranslatorHandle::new(StubTranslator::new()),
        );
        // Simulate an engine that already won the start race.
        engine.running.store(true, Ordering::SeqCst);
        assert!(matches!(engine.start(), Err(CaptioError::AlreadyRunning)));
        // The rejected call must not clear the winner's flag.
        assert!(engine.running.load(Ordering::SeqCst));
    }

    #[test]
    fn warm_up_transitions_to_idle() {
        use crate::inference::stub::{StubRecognizer, StubTranslator};

        let engine = CaptionEngine::new(
            CaptionConfig::default(),
            RecognizerHandle::new(StubRecognizer::new()),
            TranslatorHandle::new(StubTranslator::new()),
        );
        engine.warm_up().expect("stub warm-up succeeds");
        assert_eq!(engine.status(), EngineStatus::Idle);
    }
}
