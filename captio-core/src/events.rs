//! Event types emitted on the engine's broadcast channels.
//!
//! All types derive `serde::Serialize` + `serde::Deserialize` so host
//! applications can forward them over whatever bus they use (IPC, WebSocket,
//! plain JSON lines on stdout).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Caption events
// ---------------------------------------------------------------------------

/// Emitted once per completed scheduler cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionEvent {
    /// Monotonically increasing event sequence number.
    pub seq: u64,
    /// The caption pair for this cycle, or a one-shot error message.
    pub update: CaptionUpdate,
}

/// Result of one inference cycle.
///
/// The display shows a single current value; each event overwrites the
/// previous one. An `Error` update applies to its own cycle only — the next
/// successful cycle replaces it with a normal pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CaptionUpdate {
    /// A recognized/translated caption pair.
    Caption {
        /// Recognized text in the source language.
        original: String,
        /// Translated text in the target language.
        translated: String,
    },
    /// Recognition or translation failed for this window.
    Error { message: String },
}

// ---------------------------------------------------------------------------
// Engine status events
// ---------------------------------------------------------------------------

/// Emitted when the engine state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatusEvent {
    pub status: EngineStatus,
    /// Optional human-readable detail (e.g. error message).
    pub detail: Option<String>,
}

/// Current state of the captioning engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    /// Engine created but `start()` not yet called.
    Idle,
    /// Warming up the recognizer/translator backends.
    WarmingUp,
    /// Actively capturing audio and captioning.
    Listening,
    /// Capture stopped; engine may be restarted.
    Stopped,
    /// Unrecoverable error — restart required.
    Error,
}
