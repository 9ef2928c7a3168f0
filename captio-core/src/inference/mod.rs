//! Recognition and translation collaborator abstractions.
//!
//! The `SpeechRecognizer` and `Translator` traits decouple the scheduler
//! from any specific backend (stub echo, Whisper, an HTTP translation
//! service, etc.). From the scheduler's viewpoint both are synchronous,
//! blocking calls; no timeout is enforced, so an unresponsive backend stalls
//! all future caption updates until it returns.
//!
//! `&mut self` intentionally expresses that backends are stateful — decoder
//! caches, warmed sessions, connection pools. All mutation is serialised
//! through the handles' `parking_lot::Mutex`.

pub mod stub;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffering::AudioWindow;
use crate::error::Result;

/// Contract for speech recognition backends.
pub trait SpeechRecognizer: Send + 'static {
    /// One-time warm-up: load weights, run a dummy inference. Called once at
    /// engine startup.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be initialised.
    fn warm_up(&mut self) -> Result<()>;

    /// Recognize a fixed-duration mono window into source-language text.
    ///
    /// # Errors
    /// Returns `CaptioError::Recognition` on malformed input or backend
    /// failure. The scheduler recovers locally; the failed window is not
    /// retried.
    fn recognize(&mut self, window: &AudioWindow) -> Result<String>;

    /// Reset any internal decoder state.
    fn reset(&mut self);
}

/// Contract for translation backends.
pub trait Translator: Send + 'static {
    /// One-time warm-up. Called once at engine startup.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be initialised.
    fn warm_up(&mut self) -> Result<()>;

    /// Translate recognized text into the target language.
    ///
    /// # Errors
    /// Returns `CaptioError::Translation` on backend failure.
    fn translate(&mut self, text: &str) -> Result<String>;

    /// Reset any internal state.
    fn reset(&mut self);
}

/// Thread-safe reference-counted handle to any `SpeechRecognizer`.
#[derive(Clone)]
pub struct RecognizerHandle(pub Arc<Mutex<dyn SpeechRecognizer>>);

impl RecognizerHandle {
    pub fn new<R: SpeechRecognizer>(recognizer: R) -> Self {
        Self(Arc::new(Mutex::new(recognizer)))
    }
}

impl std::fmt::Debug for RecognizerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognizerHandle").finish_non_exhaustive()
    }
}

/// Thread-safe reference-counted handle to any `Translator`.
#[derive(Clone)]
pub struct TranslatorHandle(pub Arc<Mutex<dyn Translator>>);

impl TranslatorHandle {
    pub fn new<T: Translator>(translator: T) -> Self {
        Self(Arc::new(Mutex::new(translator)))
    }
}

impl std::fmt::Debug for TranslatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorHandle").finish_non_exhaustive()
    }
}
