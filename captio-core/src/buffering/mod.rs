//! Shared audio buffer between the capture callback and the scheduler.
//!
//! `ChunkAccumulator` is the single shared mutable resource in the engine:
//! the audio callback appends mono blocks, the scheduler worker atomically
//! test-and-extracts fixed-size windows. Both operations are whole critical
//! sections under one `parking_lot::Mutex`, and the lock is never held
//! across a recognizer/translator call.
//!
//! ## Drop-excess policy
//!
//! `try_extract_window` discards *all* buffered content once a window is
//! taken, including samples beyond the window length. Audio that arrives
//! faster than windows are consumed is silently lost. This is the accepted
//! contract, not a bug: a dropped window cannot be retried anyway because
//! its source samples no longer exist.

pub mod window;

use std::sync::Arc;

use parking_lot::Mutex;

pub use window::AudioWindow;

/// Append-only (producer side) / drain-to-empty (consumer side) sample buffer.
///
/// Cloning is cheap and shares the underlying buffer; the capture callback
/// and the scheduler each hold one clone.
#[derive(Clone, Default)]
pub struct ChunkAccumulator {
    inner: Arc<Mutex<BufferInner>>,
}

#[derive(Default)]
struct BufferInner {
    /// Ordered mono blocks, one per audio callback invocation.
    blocks: Vec<Vec<f32>>,
    /// Invariant: always equals the sum of `blocks` lengths. Tracked
    /// incrementally so readiness checks never walk the block list.
    total_samples: usize,
}

impl ChunkAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interleaved frame, downmixing to mono by channel averaging.
    ///
    /// The downmix runs before the lock is taken, so the critical section is
    /// a single `Vec` push. Safe on the real-time callback path: no I/O, no
    /// unbounded work, lock held only for the append.
    ///
    /// Trailing samples of a partial frame (`samples.len()` not a multiple
    /// of `channels`) are ignored.
    pub fn push_interleaved(&self, samples: &[f32], channels: usize) {
        if channels == 0 || samples.is_empty() {
            return;
        }
        if channels == 1 {
            self.push_mono(samples);
            return;
        }

        let frames = samples.len() / channels;
        let mut mono = Vec::with_capacity(frames);
        for f in 0..frames {
            let base = f * channels;
            let mut sum = 0f32;
            for c in 0..channels {
                sum += samples[base + c];
            }
            mono.push(sum / channels as f32);
        }
        self.append_block(mono);
    }

    /// Append a block that is already mono. The slice is copied because the
    /// audio source may reuse its storage after the callback returns.
    pub fn push_mono(&self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }
        self.append_block(samples.to_vec());
    }

    /// Atomically test-and-extract one fixed-size window.
    ///
    /// Returns `None` (no side effect) while fewer than `window_samples`
    /// samples are buffered. Otherwise returns the first `window_samples`
    /// samples in arrival order and clears the entire buffer, discarding any
    /// excess (see module docs).
    pub fn try_extract_window(&self, window_samples: usize) -> Option<Vec<f32>> {
        if window_samples == 0 {
            return None;
        }

        let mut inner = self.inner.lock();
        if inner.total_samples < window_samples {
            return None;
        }

        let mut window = Vec::with_capacity(window_samples);
        for block in &inner.blocks {
            let remaining = window_samples - window.len();
            if remaining == 0 {
                break;
            }
            let take = remaining.min(block.len());
            window.extend_from_slice(&block[..take]);
        }

        inner.blocks.clear();
        inner.total_samples = 0;
        Some(window)
    }

    /// Total buffered samples (O(1), from the tracked count).
    pub fn buffered_samples(&self) -> usize {
        self.inner.lock().total_samples
    }

    /// Discard all buffered content.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.blocks.clear();
        inner.total_samples = 0;
    }

    fn append_block(&self, block: Vec<f32>) {
        let mut inner = self.inner.lock();
        inner.total_samples += block.len();
        inner.blocks.push(block);
    }
}

impl std::fmt::Debug for ChunkAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ChunkAccumulator")
            .field("blocks", &inner.blocks.len())
            .field("total_samples", &inner.total_samples)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;

    use approx::assert_relative_eq;

    #[test]
    fn not_ready_below_window_size_and_buffer_untouched() {
        let acc = ChunkAccumulator::new();
        for _ in 0..20 {
            acc.push_mono(&vec![0.1; 1024]);
        }
        assert_eq!(acc.buffered_samples(), 20_480);
        assert!(acc.try_extract_window(32_000).is_none());
        // Not-ready has no side effect.
        assert_eq!(acc.buffered_samples(), 20_480);
    }

    #[test]
    fn extraction_returns_exact_window_and_drops_excess() {
        let acc = ChunkAccumulator::new();
        // 32 frames of 1024 = 32 768 samples with a monotone ramp.
        let mut value = 0f32;
        for _ in 0..32 {
            let frame: Vec<f32> = (0..1024)
                .map(|_| {
                    value += 1.0;
                    value
                })
                .collect();
            acc.push_mono(&frame);
        }
        assert_eq!(acc.buffered_samples(), 32_768);

        let window = acc.try_extract_window(32_000).expect("window ready");
        assert_eq!(window.len(), 32_000);
        assert_eq!(window[0], 1.0);
        assert_eq!(window[31_999], 32_000.0);
        // The 768 excess samples are dropped, not retained.
        assert_eq!(acc.buffered_samples(), 0);
        assert!(acc.try_extract_window(32_000).is_none());
    }

    #[test]
    fn exact_fill_extracts_and_empties() {
        let acc = ChunkAccumulator::new();
        acc.push_mono(&vec![0.5; 4_000]);
        let window = acc.try_extract_window(4_000).expect("window ready");
        assert_eq!(window.len(), 4_000);
        assert_eq!(acc.buffered_samples(), 0);
    }

    #[test]
    fn downmix_averages_channels() {
        let acc = ChunkAccumulator::new();
        // Two stereo frames: (0.2, 0.4) and (-1.0, 1.0).
        acc.push_interleaved(&[0.2, 0.4, -1.0, 1.0], 2);
        let window = acc.try_extract_window(2).expect("window ready");
        assert_relative_eq!(window[0], 0.3, epsilon = 1e-6);
        assert_relative_eq!(window[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn mono_passthrough_copies_samples() {
        let acc = ChunkAccumulator::new();
        acc.push_interleaved(&[0.1, 0.2, 0.3], 1);
        assert_eq!(acc.buffered_samples(), 3);
        assert_eq!(acc.try_extract_window(3).unwrap(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn zero_channels_and_empty_pushes_are_ignored() {
        let acc = ChunkAccumulator::new();
        acc.push_interleaved(&[0.1, 0.2], 0);
        acc.push_mono(&[]);
        assert_eq!(acc.buffered_samples(), 0);
    }

    #[test]
    fn concurrent_push_and_extract_yields_no_torn_windows() {
        const FRAME: usize = 256;
        const FRAMES: usize = 400;
        const WINDOW: usize = 1_000;

        let acc = ChunkAccumulator::new();
        let producer_acc = acc.clone();

        // Producer pushes a globally increasing ramp so any torn or
        // reordered window is detectable as a non-increasing run.
        let producer = thread::spawn(move || {
            let mut value = 0f32;
            for _ in 0..FRAMES {
                let frame: Vec<f32> = (0..FRAME)
                    .map(|_| {
                        value += 1.0;
                        value
                    })
                    .collect();
                producer_acc.push_mono(&frame);
            }
        });

        let mut windows = Vec::new();
        // Poll aggressively while the producer runs, then drain what is left.
        while !producer.is_finished() {
            if let Some(w) = acc.try_extract_window(WINDOW) {
                windows.push(w);
            }
        }
        producer.join().expect("producer thread panicked");
        while let Some(w) = acc.try_extract_window(WINDOW) {
            windows.push(w);
        }

        assert!(!windows.is_empty(), "expected at least one window");
        let mut last_end = 0f32;
        for window in &windows {
            assert_eq!(window.len(), WINDOW);
            // Strictly increasing inside a window (contiguity can break
            // across windows because extraction drops excess).
            for pair in window.windows(2) {
                assert!(pair[1] > pair[0], "torn window: {} !> {}", pair[1], pair[0]);
            }
            assert!(window[0] > last_end, "windows extracted out of order");
            last_end = window[WINDOW - 1];
        }
    }
}
