//! Stub backends that echo metadata without real inference.
//!
//! Used by the CLI host and tests so the full capture → schedule → display
//! path can be exercised end-to-end before real models are wired in.

use crate::buffering::AudioWindow;
use crate::error::Result;
use crate::inference::{SpeechRecognizer, Translator};
use tracing::debug;

/// Echo-style stub recognizer.
///
/// Emits `"[window N: <len> samples @ <rate> Hz]"` for every window, so
/// each caption is distinguishable in the display.
#[derive(Default)]
pub struct StubRecognizer {
    window_count: u32,
}

impl StubRecognizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpeechRecognizer for StubRecognizer {
    fn warm_up(&mut self) -> Result<()> {
        debug!("StubRecognizer::warm_up — no-op");
        Ok(())
    }

    fn recognize(&mut self, window: &AudioWindow) -> Result<String> {
        self.window_count += 1;
        Ok(format!(
            "[window {}: {} samples @ {} Hz]",
            self.window_count,
            window.samples.len(),
            window.sample_rate
        ))
    }

    fn reset(&mut self) {
        debug!("StubRecognizer::reset");
        self.window_count = 0;
    }
}

/// Stub translator that tags the input instead of translating it.
#[derive(Default)]
pub struct StubTranslator;

impl StubTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl Translator for StubTranslator {
    fn warm_up(&mut self) -> Result<()> {
        debug!("StubTranslator::warm_up — no-op");
        Ok(())
    }

    fn translate(&mut self, text: &str) -> Result<String> {
        Ok(format!("(translated) {text}"))
    }

    fn reset(&mut self) {
        debug!("StubTranslator::reset");
    }
}
