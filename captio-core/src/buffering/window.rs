//! Typed audio window handed from the accumulator to the recognizer.

/// A fixed-duration block of mono PCM samples at a known sample rate.
///
/// Created once per scheduler cycle and consumed within it.
#[derive(Debug, Clone)]
pub struct AudioWindow {
    /// Mono f32 samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g. 16000).
    pub sample_rate: u32,
}

impl AudioWindow {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Returns the duration of this window in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Returns true if the window contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_matches_sample_count() {
        let window = AudioWindow::new(vec![0.0; 32_000], 16_000);
        assert!((window.duration_secs() - 2.0).abs() < 1e-9);
        assert!(!window.is_empty());
    }
}
