//! # captio-core
//!
//! Live-captioning engine: captures system playback (monitor) audio and
//! turns it into translated caption pairs.
//!
//! ## Architecture
//!
//! ```text
//! Monitor device → AudioCapture ─push─► ChunkAccumulator (one lock)
//!                                             │ try_extract_window
//!                                    Scheduler(spawn_blocking, 500 ms poll)
//!                                             │
//!                              SpeechRecognizer::recognize
//!                                             │
//!                                   Translator::translate
//!                                             │
//!                                 CaptionSink::update(CaptionEvent)
//! ```
//!
//! The audio callback only downmixes and appends. All inference happens on
//! the scheduler worker; audio exceeding one window per cycle is dropped by
//! the accumulator's documented policy.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod buffering;
pub mod engine;
pub mod error;
pub mod events;
pub mod inference;
pub mod sink;

// Convenience re-exports for downstream crates
pub use buffering::{AudioWindow, ChunkAccumulator};
pub use engine::{CaptionConfig, CaptionEngine};
pub use error::CaptioError;
pub use events::{CaptionEvent, CaptionUpdate, EngineStatus, EngineStatusEvent};
pub use inference::{RecognizerHandle, SpeechRecognizer, Translator, TranslatorHandle};
pub use sink::CaptionSink;
