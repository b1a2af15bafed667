use crate::error::{PrepError, PrepResult};
use std::time::Duration;

/// Mono waveform with its sample rate
///
/// Samples are f32 in [-1.0, 1.0] once [`Waveform::normalize_peak`] has run.
/// The pipeline treats a waveform as immutable after that point.
#[derive(Debug, Clone)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Create a new waveform
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> PrepResult<Self> {
        if sample_rate == 0 {
            return Err(PrepError::Config("sample rate must be positive".into()));
        }
        Ok(Waveform {
            samples,
            sample_rate,
        })
    }

    /// Get reference to the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get owned samples (consumes waveform)
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Get sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the waveform holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the waveform
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    /// Peak absolute amplitude
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .map(|&s| s.abs())
            .fold(0.0f32, |a, b| a.max(b))
    }

    /// Rescale to unit peak when requested, or whenever the signal would
    /// otherwise clip
    ///
    /// Silence is left untouched.
    pub fn normalize_peak(&mut self, always: bool) {
        let peak = self.peak();
        if peak > 0.0 && (always || peak > 1.0) {
            for s in &mut self.samples {
                *s /= peak;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_creation() {
        let wav = Waveform::new(vec![0.1, -0.2, 0.3], 22050).unwrap();
        assert_eq!(wav.len(), 3);
        assert_eq!(wav.sample_rate(), 22050);
        assert!((wav.peak() - 0.3).abs() < 1e-7);
    }

    #[test]
    fn test_invalid_sample_rate() {
        assert!(Waveform::new(vec![0.0], 0).is_err());
    }

    #[test]
    fn test_peak_norm_always() {
        let mut wav = Waveform::new(vec![0.0, 0.25, -0.5], 22050).unwrap();
        wav.normalize_peak(true);
        assert!((wav.peak() - 1.0).abs() < 1e-6);
        assert!((wav.samples()[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_peak_norm_only_on_clipping() {
        let mut wav = Waveform::new(vec![0.0, 0.5], 22050).unwrap();
        wav.normalize_peak(false);
        // below unity, untouched
        assert!((wav.samples()[1] - 0.5).abs() < 1e-6);

        let mut loud = Waveform::new(vec![0.0, 2.0], 22050).unwrap();
        loud.normalize_peak(false);
        assert!((loud.peak() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_peak_norm_ignores_silence() {
        let mut wav = Waveform::new(vec![0.0, 0.0, 0.0], 22050).unwrap();
        wav.normalize_peak(true);
        assert_eq!(wav.samples(), &[0.0, 0.0, 0.0]);
    }
}
