use crate::error::{PrepError, PrepResult};
use hound::{SampleFormat, WavReader};
use std::path::Path;

/// Read a WAV file into interleaved f32 samples
///
/// Returns `(samples, sample_rate, channels)`. Integer PCM of any supported
/// bit depth is scaled to [-1.0, 1.0].
pub fn read(path: &Path) -> PrepResult<(Vec<f32>, u32, usize)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()?
        }
    };

    if samples.is_empty() {
        return Err(PrepError::Format {
            path: path.to_path_buf(),
            detail: "file contains no samples".to_string(),
        });
    }

    Ok((samples, spec.sample_rate, spec.channels as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn write_wav(path: &Path, spec: WavSpec, samples: &[i16]) {
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_int16() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        write_wav(&path, spec, &[0, 16384, -16384, i16::MAX]);

        let (samples, rate, channels) = read(&path).unwrap();
        assert_eq!(rate, 22050);
        assert_eq!(channels, 1);
        assert_eq!(samples.len(), 4);
        assert!(samples[0].abs() < 1e-6);
        assert!((samples[1] - 0.5).abs() < 1e-4);
        assert!((samples[2] + 0.5).abs() < 1e-4);
        assert!(samples[3] <= 1.0);
    }

    #[test]
    fn test_read_float32() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for s in [0.0f32, 0.25, -0.75] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let (samples, _, _) = read(&path).unwrap();
        assert_eq!(samples, vec![0.0, 0.25, -0.75]);
    }

    #[test]
    fn test_read_empty_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        write_wav(&path, spec, &[]);

        assert!(matches!(read(&path), Err(PrepError::Format { .. })));
    }
}
