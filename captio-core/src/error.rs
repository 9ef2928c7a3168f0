use thiserror::Error;

/// All errors produced by captio-core.
///
/// "Buffer not ready" is deliberately absent: `try_extract_window` models it
/// as `None` because an underfilled buffer is normal flow control, not a
/// failure.
#[derive(Debug, Error)]
pub enum CaptioError {
    #[error("audio device error: {0}")]
    AudioDevice(String),

    #[error("audio stream error: {0}")]
    AudioStream(String),

    #[error("no monitor (loopback) input device found")]
    MonitorDeviceNotFound,

    #[error("speech recognition error: {0}")]
    Recognition(String),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("engine is already running")]
    AlreadyRunning,

    #[error("engine is not running")]
    NotRunning,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CaptioError>;
