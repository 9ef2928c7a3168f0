//! System-audio capture via cpal backend.
//!
//! # Design constraints
//!
//! The cpal input callback runs on an OS audio thread. It **must not**
//! perform I/O, inference, or unbounded work. The only blocking it does is
//! the accumulator's mutex, held by either side just long enough to append
//! or extract.
//!
//! # Threading note
//!
//! `cpal::Stream` is `!Send` on most platforms (COM on Windows, CoreAudio on
//! macOS). `AudioCapture` therefore must be created and dropped on the same
//! thread. The engine accomplishes this by calling `open_monitor` inside
//! `spawn_blocking`.

pub mod device;

#[cfg(feature = "audio-cpal")]
use cpal::{
    traits::{DeviceTrait, StreamTrait},
    BufferSize, SampleFormat, SampleRate, Stream, StreamConfig,
};

use crate::buffering::ChunkAccumulator;
use crate::engine::CaptionConfig;
use crate::error::Result;
#[cfg(feature = "audio-cpal")]
use crate::error::CaptioError;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
#[cfg(feature = "audio-cpal")]
use tracing::{error, info};

/// Handle to an active capture stream on the system monitor device.
///
/// **Not `Send`** — `cpal::Stream` is bound to its creation thread on
/// Windows/macOS. Create and drop this type on the same OS thread.
pub struct AudioCapture {
    /// Kept alive so the stream is not dropped prematurely.
    #[cfg(feature = "audio-cpal")]
    _stream: Stream,
    /// Shared flag — set to `false` to signal the callback to no-op.
    running: Arc<AtomicBool>,
}

impl AudioCapture {
    /// Open the first monitor device and push mono frames into `accumulator`.
    ///
    /// The stream is requested at `config.sample_rate` with
    /// `config.block_size` frames per callback; the device's native channel
    /// count is kept and downmixed by the accumulator.
    ///
    /// # Errors
    /// Returns `CaptioError::MonitorDeviceNotFound` when no monitor device
    /// exists, or `CaptioError::AudioStream` if cpal fails to build or start
    /// the stream.
    #[cfg(feature = "audio-cpal")]
    pub fn open_monitor(
        accumulator: ChunkAccumulator,
        running: Arc<AtomicBool>,
        config: &CaptionConfig,
    ) -> Result<Self> {
        let device = device::find_monitor_device()?;

        let supported = device
            .default_input_config()
            .map_err(|e| CaptioError::AudioDevice(e.to_string()))?;
        let channels = supported.channels();

        info!(
            sample_rate = config.sample_rate,
            block_size = config.block_size,
            channels,
            "opening monitor capture stream"
        );

        let stream_config = StreamConfig {
            channels,
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: BufferSize::Fixed(config.block_size as u32),
        };

        let ch = channels as usize;
        let running_f32 = Arc::clone(&running);
        let running_i16 = Arc::clone(&running);
        let running_u8 = Arc::clone(&running);

        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _info| {
                    if !running_f32.load(Ordering::Relaxed) {
                        return;
                    }
                    accumulator.push_interleaved(data, ch);
                },
                |err| error!("audio stream error: {err}"),
                None,
            ),

            SampleFormat::I16 => {
                let mut scratch: Vec<f32> = Vec::new();
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _info| {
                        if !running_i16.load(Ordering::Relaxed) {
                            return;
                        }
                        scratch.resize(data.len(), 0.0);
                        for (dst, src) in scratch.iter_mut().zip(data) {
                            *dst = *src as f32 / 32768.0;
                        }
                        accumulator.push_interleaved(&scratch, ch);
                    },
                    |err| error!("audio stream error: {err}"),
                    None,
                )
            }

            SampleFormat::U8 => {
                let mut scratch: Vec<f32> = Vec::new();
                device.build_input_stream(
                    &stream_config,
                    move |data: &[u8], _info| {
                        if !running_u8.load(Ordering::Relaxed) {
                            return;
                        }
                        scratch.resize(data.len(), 0.0);
                        for (dst, src) in scratch.iter_mut().zip(data) {
                            *dst = (*src as f32 - 128.0) / 128.0;
                        }
                        accumulator.push_interleaved(&scratch, ch);
                    },
                    |err| error!("audio stream error: {err}"),
                    None,
                )
            }

            fmt => {
                return Err(CaptioError::AudioStream(format!(
                    "unsupported sample format: {fmt:?}"
                )))
            }
        }
        .map_err(|e| CaptioError::AudioStream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptioError::AudioStream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            running,
        })
    }

    /// Stop: signal the callback to no-op on its next invocation. The device
    /// itself is released when this handle is dropped (on its own thread).
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Stub when the `audio-cpal` feature is disabled.
#[cfg(not(feature = "audio-cpal"))]
impl AudioCapture {
    pub fn open_monitor(
        _accumulator: ChunkAccumulator,
        _running: Arc<AtomicBool>,
        _config: &CaptionConfig,
    ) -> Result<Self> {
        Err(crate::error::CaptioError::AudioStream(
            "compiled without audio-cpal feature".into(),
        ))
    }
}
