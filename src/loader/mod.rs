//! Waveform loading
//!
//! Reads an audio file into a mono [`Waveform`] at the configured sample
//! rate. WAV files go through `hound`; anything else is probed and decoded
//! by symphonia. The pipeline performs no resampling, so a sample rate
//! embedded in the file that disagrees with the configuration is a hard
//! error rather than a silent conversion.

/// Symphonia-based loader for compressed containers
pub mod symphonia;
/// Direct WAV reading via hound
pub mod wav;

pub use self::symphonia::SymphoniaLoader;

use crate::config::PrepConfig;
use crate::core::Waveform;
use crate::error::{PrepError, PrepResult};
use std::path::Path;

/// Load an audio file as a mono waveform, verifying its sample rate
pub fn load<P: AsRef<Path>>(path: P, config: &PrepConfig) -> PrepResult<Waveform> {
    let path = path.as_ref();

    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);

    let (samples, sample_rate, channels) = if is_wav {
        wav::read(path)?
    } else {
        SymphoniaLoader::from_file(path)?.decode_all()?
    };

    if sample_rate != config.sample_rate {
        return Err(PrepError::Format {
            path: path.to_path_buf(),
            detail: format!(
                "sample rate {} does not match configured {} (resampling is not performed)",
                sample_rate, config.sample_rate
            ),
        });
    }

    let samples = downmix(samples, channels);
    if samples.is_empty() {
        return Err(PrepError::Format {
            path: path.to_path_buf(),
            detail: "file contains no samples".to_string(),
        });
    }

    Waveform::new(samples, sample_rate)
}

/// Collapse interleaved channels into mono by averaging
fn downmix(samples: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix(samples.clone(), 1), samples);
    }

    #[test]
    fn test_downmix_stereo_average() {
        let samples = vec![0.2, 0.4, -0.5, 0.5];
        let mono = downmix(samples, 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
    }

    #[test]
    fn test_load_rejects_rate_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let config = PrepConfig {
            sample_rate: 22050,
            ..Default::default()
        };
        let result = load(&path, &config);
        assert!(matches!(result, Err(PrepError::Format { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let config = PrepConfig::default();
        assert!(load("/nonexistent/file.wav", &config).is_err());
    }
}
