//! Hyperparameter configuration
//!
//! All tunables for the preprocessing run live in one immutable [`PrepConfig`]
//! loaded once at startup, either from defaults or from a JSON file. Components
//! receive a reference at construction time; nothing reads ambient state.

use crate::error::{PrepError, PrepResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Target vocoder family, which decides the quantization of the waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VocoderMode {
    /// Predicts the next sample as a categorical distribution over levels
    #[serde(rename = "discrete-class")]
    DiscreteClass,
    /// Predicts the next sample via a continuous mixture; always trains
    /// against 16-bit linear targets
    #[serde(rename = "continuous-mixture")]
    ContinuousMixture,
}

/// Preprocessing hyperparameters
///
/// Defaults match the reference 22.05 kHz single-speaker setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// Expected sample rate of every input file (no resampling is done)
    pub sample_rate: u32,
    /// FFT size for the spectral transform
    pub n_fft: usize,
    /// Samples advanced between successive analysis frames
    pub hop_length: usize,
    /// Analysis window length, zero-padded up to `n_fft`
    pub win_length: usize,
    /// Number of mel filterbank bands
    pub num_mels: usize,
    /// Lower edge of the mel filterbank in Hz
    pub fmin: f32,
    /// Upper edge of the mel filterbank in Hz; `None` means Nyquist
    pub fmax: Option<f32>,
    /// Dynamic range floor in dB for spectrogram normalization
    pub min_level_db: f32,
    /// Reference level in dB subtracted before normalization
    pub ref_level_db: f32,
    /// Apply a first-order pre-emphasis filter before the STFT
    pub preemphasis: bool,
    /// Pre-emphasis coefficient
    pub preemphasis_coef: f32,
    /// Normalize spectrograms into [-1, 1] instead of [0, 1]
    pub symmetric_mels: bool,
    /// Always rescale waveforms to unit peak (clipping input is rescaled
    /// regardless)
    pub peak_norm: bool,
    /// Quantizer bit depth for the discrete-class path
    pub bits: u32,
    /// Use mu-law companding for the discrete-class path
    pub mu_law: bool,
    /// Target vocoder family
    pub voc_mode: VocoderMode,
    /// Corpus root searched for audio files
    pub wav_path: PathBuf,
    /// File extension searched for, with or without the leading dot
    pub extension: String,
    /// Root directory for output artifacts
    pub data_path: PathBuf,
    /// Skip transcript extraction entirely
    pub ignore_tts: bool,
    /// Corpus layout for transcript extraction
    pub corpus_format: String,
}

impl Default for PrepConfig {
    fn default() -> Self {
        PrepConfig {
            sample_rate: 22050,
            n_fft: 2048,
            hop_length: 275,
            win_length: 1100,
            num_mels: 80,
            fmin: 40.0,
            fmax: None,
            min_level_db: -100.0,
            ref_level_db: 20.0,
            preemphasis: false,
            preemphasis_coef: 0.97,
            symmetric_mels: false,
            peak_norm: false,
            bits: 9,
            mu_law: true,
            voc_mode: VocoderMode::DiscreteClass,
            wav_path: PathBuf::from("dataset"),
            extension: ".wav".to_string(),
            data_path: PathBuf::from("data"),
            ignore_tts: false,
            corpus_format: "ljspeech".to_string(),
        }
    }
}

impl PrepConfig {
    /// Load configuration from a JSON file, falling back to defaults for
    /// omitted fields
    pub fn from_file<P: AsRef<Path>>(path: P) -> PrepResult<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: PrepConfig = serde_json::from_str(&data)
            .map_err(|e| PrepError::Config(format!("invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check hyperparameter consistency, failing before any processing begins
    pub fn validate(&self) -> PrepResult<()> {
        if self.sample_rate == 0 {
            return Err(PrepError::Config("sample_rate must be positive".into()));
        }
        if self.n_fft == 0 || self.hop_length == 0 || self.win_length == 0 {
            return Err(PrepError::Config(
                "n_fft, hop_length and win_length must be positive".into(),
            ));
        }
        if self.win_length > self.n_fft {
            return Err(PrepError::Config(format!(
                "win_length {} exceeds n_fft {}",
                self.win_length, self.n_fft
            )));
        }
        if self.num_mels == 0 || self.num_mels > self.n_fft / 2 + 1 {
            return Err(PrepError::Config(format!(
                "num_mels {} must be in 1..={} for n_fft {}",
                self.num_mels,
                self.n_fft / 2 + 1,
                self.n_fft
            )));
        }
        let nyquist = self.sample_rate as f32 / 2.0;
        if self.fmin < 0.0 || self.fmax.unwrap_or(nyquist) > nyquist {
            return Err(PrepError::Config(format!(
                "mel frequency range must lie in 0..={} Hz",
                nyquist
            )));
        }
        if self.fmax.unwrap_or(nyquist) <= self.fmin {
            return Err(PrepError::Config("fmax must exceed fmin".into()));
        }
        if self.min_level_db >= 0.0 {
            return Err(PrepError::Config("min_level_db must be negative".into()));
        }
        if self.bits == 0 || self.bits > 16 {
            return Err(PrepError::Config(format!(
                "bit depth must be in 1..=16, got {}",
                self.bits
            )));
        }
        Ok(())
    }

    /// Upper mel filterbank edge, defaulting to Nyquist
    pub fn fmax(&self) -> f32 {
        self.fmax.unwrap_or(self.sample_rate as f32 / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PrepConfig::default().validate().is_ok());
    }

    #[test]
    fn test_too_many_mel_bands() {
        let config = PrepConfig {
            n_fft: 128,
            num_mels: 80,
            win_length: 128,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_bit_depth() {
        let config = PrepConfig {
            bits: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PrepConfig {
            bits: 17,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_longer_than_fft() {
        let config = PrepConfig {
            n_fft: 512,
            win_length: 1024,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"sample_rate": 16000, "voc_mode": "continuous-mixture"}}"#
        )
        .unwrap();

        let config = PrepConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.voc_mode, VocoderMode::ContinuousMixture);
        // untouched fields keep their defaults
        assert_eq!(config.num_mels, 80);
        assert!(config.mu_law);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(PrepConfig::from_file(file.path()).is_err());
    }
}
