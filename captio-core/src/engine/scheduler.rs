//! Blocking scheduler loop.
//!
//! ## Cycle (per iteration)
//!
//! ```text
//! 1. Sleep poll_interval (fixed cadence — the loop's only suspension point)
//! 2. try_extract_window on the shared accumulator
//! 3. Not ready → poll again
//! 4. Ready → recognize → translate → sink.update(CaptionEvent)
//! 5. On a recognition/translation error: emit one error caption, continue
//! ```
//!
//! The loop runs in `spawn_blocking`, decoupled from both the real-time
//! audio callback and the display's own thread. Recognition and translation
//! block the loop for their full duration; audio keeps accumulating
//! meanwhile and anything beyond one window is dropped at the next
//! extraction (the accumulator's documented policy). The loop sleeps the
//! full poll interval even after a busy cycle, matching a fixed 500 ms
//! cadence rather than draining back-to-back.
//!
//! No timeout guards the collaborator calls: a hung backend stalls all
//! future caption updates until it returns.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::{
    buffering::{AudioWindow, ChunkAccumulator},
    engine::CaptionConfig,
    events::{CaptionEvent, CaptionUpdate},
    inference::{RecognizerHandle, TranslatorHandle},
    sink::CaptionSink,
};

#[derive(Default)]
pub struct SchedulerDiagnostics {
    pub idle_polls: AtomicUsize,
    pub windows_extracted: AtomicUsize,
    pub recognitions: AtomicUsize,
    pub recognition_errors: AtomicUsize,
    pub translations: AtomicUsize,
    pub translation_errors: AtomicUsize,
    pub captions_emitted: AtomicUsize,
    pub error_captions_emitted: AtomicUsize,
}

impl SchedulerDiagnostics {
    pub fn reset(&self) {
        self.idle_polls.store(0, Ordering::Relaxed);
        self.windows_extracted.store(0, Ordering::Relaxed);
        self.recognitions.store(0, Ordering::Relaxed);
        self.recognition_errors.store(0, Ordering::Relaxed);
        self.translations.store(0, Ordering::Relaxed);
        self.translation_errors.store(0, Ordering::Relaxed);
        self.captions_emitted.store(0, Ordering::Relaxed);
        self.error_captions_emitted.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            idle_polls: self.idle_polls.load(Ordering::Relaxed),
            windows_extracted: self.windows_extracted.load(Ordering::Relaxed),
            recognitions: self.recognitions.load(Ordering::Relaxed),
            recognition_errors: self.recognition_errors.load(Ordering::Relaxed),
            translations: self.translations.load(Ordering::Relaxed),
            translation_errors: self.translation_errors.load(Ordering::Relaxed),
            captions_emitted: self.captions_emitted.load(Ordering::Relaxed),
            error_captions_emitted: self.error_captions_emitted.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DiagnosticsSnapshot {
    pub idle_polls: usize,
    pub windows_extracted: usize,
    pub recognitions: usize,
    pub recognition_errors: usize,
    pub translations: usize,
    pub translation_errors: usize,
    pub captions_emitted: usize,
    pub error_captions_emitted: usize,
}

/// All context the scheduler needs, passed as one struct so the closure
/// stays tidy.
pub struct SchedulerContext {
    pub config: CaptionConfig,
    pub accumulator: ChunkAccumulator,
    pub recognizer: RecognizerHandle,
    pub translator: TranslatorHandle,
    pub sink: Arc<dyn CaptionSink>,
    pub running: Arc<AtomicBool>,
    pub seq: Arc<AtomicU64>,
    pub diagnostics: Arc<SchedulerDiagnostics>,
}

/// Run the blocking scheduler until `ctx.running` becomes false.
pub fn run(ctx: SchedulerContext) {
    let window_samples = ctx.config.window_samples();
    let poll_interval = Duration::from_millis(ctx.config.poll_interval_ms);
    info!(
        window_samples,
        poll_interval_ms = ctx.config.poll_interval_ms,
        "scheduler started"
    );

    loop {
        // ── 0. Check running flag on both sides of the sleep ─────────────
        if !ctx.running.load(Ordering::Relaxed) {
            break;
        }
        std::thread::sleep(poll_interval);
        if !ctx.running.load(Ordering::Relaxed) {
            break;
        }

        // ── 1. Test-and-extract one window ───────────────────────────────
        let Some(samples) = ctx.accumulator.try_extract_window(window_samples) else {
            ctx.diagnostics.idle_polls.fetch_add(1, Ordering::Relaxed);
            continue;
        };
        ctx.diagnostics
            .windows_extracted
            .fetch_add(1, Ordering::Relaxed);
        let window = AudioWindow::new(samples, ctx.config.sample_rate);

        // ── 2. Recognize + translate, lock never spans the accumulator ───
        let cycle_start = Instant::now();
        run_cycle(&ctx, &window);
        debug!(
            elapsed_ms = cycle_start.elapsed().as_millis() as u64,
            "cycle complete"
        );
    }

    let snap = ctx.diagnostics.snapshot();
    info!(
        idle_polls = snap.idle_polls,
        windows_extracted = snap.windows_extracted,
        recognitions = snap.recognitions,
        recognition_errors = snap.recognition_errors,
        translations = snap.translations,
        translation_errors = snap.translation_errors,
        captions_emitted = snap.captions_emitted,
        error_captions_emitted = snap.error_captions_emitted,
        "scheduler stopped — diagnostics"
    );
}

/// One inference cycle: window → text → translation → sink.
///
/// Errors are terminal for this cycle only — they surface as a single
/// error caption and the loop keeps polling. The failed window is not
/// retried; its source audio is already gone.
fn run_cycle(ctx: &SchedulerContext, window: &AudioWindow) {
    ctx.diagnostics.recognitions.fetch_add(1, Ordering::Relaxed);
    let original = {
        let mut recognizer = ctx.recognizer.0.lock();
        match recognizer.recognize(window) {
            Ok(text) => text,
            Err(e) => {
                ctx.diagnostics
                    .recognition_errors
                    .fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "recognition failed for this window");
                emit_error(ctx, &e.to_string());
                return;
            }
        }
    };

    ctx.diagnostics.translations.fetch_add(1, Ordering::Relaxed);
    let translated = {
        let mut translator = ctx.translator.0.lock();
        match translator.translate(&original) {
            Ok(text) => text,
            Err(e) => {
                ctx.diagnostics
                    .translation_errors
                    .fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "translation failed for this window");
                emit_error(ctx, &e.to_string());
                return;
            }
        }
    };

    let seq = ctx.seq.fetch_add(1, Ordering::Relaxed);
    debug!(
        seq,
        original = original.as_str(),
        translated = translated.as_str(),
        "caption pair ready"
    );
    ctx.sink.update(CaptionEvent {
        seq,
        update: CaptionUpdate::Caption {
            original,
            translated,
        },
    });
    ctx.diagnostics
        .captions_emitted
        .fetch_add(1, Ordering::Relaxed);
}

fn emit_error(ctx: &SchedulerContext, message: &str) {
    let seq = ctx.seq.fetch_add(1, Ordering::Relaxed);
    ctx.sink.update(CaptionEvent {
        seq,
        update: CaptionUpdate::Error {
            message: message.to_string(),
        },
    });
    ctx.diagnostics
        .error_captions_emitted
        .fetch_add(1, Ordering::Relaxed);
}
