//! Per-file pipeline: load, transform, quantize, persist
//!
//! Each invocation is self-contained, so whole invocations can run on
//! independent worker threads with nothing shared but the immutable
//! [`Pipeline`] itself.

use crate::config::PrepConfig;
use crate::dsp::{MelSpectrogram, Quantizer};
use crate::error::{PrepError, PrepResult};
use crate::loader;
use crate::paths::Paths;
use ndarray::{Array1, Array2};
use ndarray_npy::WriteNpyExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// One manifest record: utterance identifier and mel frame count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Identifier derived from the input file's base name
    pub id: String,
    /// Number of spectrogram frames
    pub frames: usize,
}

/// The per-file pipeline, constructed once per run
pub struct Pipeline {
    config: PrepConfig,
    mel: MelSpectrogram,
    quantizer: Quantizer,
    paths: Paths,
}

impl Pipeline {
    /// Build the pipeline for a validated configuration
    pub fn new(config: PrepConfig, paths: Paths) -> PrepResult<Self> {
        let mel = MelSpectrogram::new(&config)?;
        let quantizer = Quantizer::for_config(&config)?;
        Ok(Pipeline {
            config,
            mel,
            quantizer,
            paths,
        })
    }

    /// The quantizer chosen for this run
    pub fn quantizer(&self) -> Quantizer {
        self.quantizer
    }

    /// Convert one audio file into its two in-memory artifacts
    pub fn convert<P: AsRef<Path>>(&self, path: P) -> PrepResult<(Array2<f32>, Vec<u16>)> {
        let mut wav = loader::load(path, &self.config)?;
        wav.normalize_peak(self.config.peak_norm);

        let mel = self.mel.transform(&wav);
        let quant = self.quantizer.encode(wav.samples());
        Ok((mel, quant))
    }

    /// Process one audio file end to end
    ///
    /// Both artifacts are computed fully in memory before anything is
    /// written, so a failure never leaves half an utterance on disk.
    pub fn process<P: AsRef<Path>>(&self, path: P) -> PrepResult<ManifestEntry> {
        let path = path.as_ref();
        self.process_inner(path)
            .map_err(|e| PrepError::for_file(path, e))
    }

    fn process_inner(&self, path: &Path) -> PrepResult<ManifestEntry> {
        let id = utterance_id(path)?;
        let (mel, quant) = self.convert(path)?;
        let frames = mel.ncols();

        write_npy_f32(&self.paths.mel_file(&id), &mel)?;
        write_npy_i64(&self.paths.quant_file(&id), &quant)?;

        Ok(ManifestEntry { id, frames })
    }
}

/// Derive the stable identifier: the file's base name, extension stripped
pub fn utterance_id(path: &Path) -> PrepResult<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| PrepError::Format {
            path: path.to_path_buf(),
            detail: "file name is not valid UTF-8".to_string(),
        })
}

fn write_npy_f32(path: &Path, array: &Array2<f32>) -> PrepResult<()> {
    let file = BufWriter::new(File::create(path)?);
    array
        .write_npy(file)
        .map_err(|e| PrepError::Write(format!("{}: {}", path.display(), e)))
}

fn write_npy_i64(path: &Path, labels: &[u16]) -> PrepResult<()> {
    // i64 on disk matches the dtype downstream training code expects
    let array: Array1<i64> = labels.iter().map(|&v| v as i64).collect();
    let file = BufWriter::new(File::create(path)?);
    array
        .write_npy(file)
        .map_err(|e| PrepError::Write(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VocoderMode;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use ndarray_npy::ReadNpyExt;
    use std::f32::consts::PI;

    fn write_sine_wav(path: &Path, rate: u32, len: usize) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..len {
            let s = (2.0 * PI * 220.0 * i as f32 / rate as f32).sin() * 0.4;
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn test_pipeline(dir: &Path) -> Pipeline {
        let config = PrepConfig {
            n_fft: 512,
            hop_length: 128,
            win_length: 512,
            num_mels: 40,
            ignore_tts: true,
            ..Default::default()
        };
        let paths = Paths::new(dir.join("data"));
        paths.ensure().unwrap();
        Pipeline::new(config, paths).unwrap()
    }

    #[test]
    fn test_utterance_id() {
        assert_eq!(utterance_id(Path::new("/x/LJ001-0001.wav")).unwrap(), "LJ001-0001");
        assert_eq!(utterance_id(Path::new("b.flac")).unwrap(), "b");
    }

    #[test]
    fn test_process_writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let wav_path = dir.path().join("utt1.wav");
        write_sine_wav(&wav_path, 22050, 22050);

        let pipeline = test_pipeline(dir.path());
        let entry = pipeline.process(&wav_path).unwrap();

        assert_eq!(entry.id, "utt1");
        assert_eq!(entry.frames, 22050 / 128 + 1);

        let mel_file = File::open(dir.path().join("data/mel/utt1.npy")).unwrap();
        let mel: Array2<f32> = Array2::read_npy(mel_file).unwrap();
        assert_eq!(mel.nrows(), 40);
        assert_eq!(mel.ncols(), entry.frames);

        let quant_file = File::open(dir.path().join("data/quant/utt1.npy")).unwrap();
        let quant: Array1<i64> = Array1::read_npy(quant_file).unwrap();
        assert_eq!(quant.len(), 22050);
        assert!(quant.iter().all(|&v| (0..512).contains(&v)));
    }

    #[test]
    fn test_failure_leaves_no_partial_pair() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("broken.wav");
        std::fs::write(&bad, b"not a wav file").unwrap();

        let pipeline = test_pipeline(dir.path());
        let err = pipeline.process(&bad).unwrap_err();
        assert!(matches!(err, PrepError::File { .. }));

        assert!(!dir.path().join("data/mel/broken.npy").exists());
        assert!(!dir.path().join("data/quant/broken.npy").exists());
    }

    #[test]
    fn test_continuous_mixture_uses_16_bits() {
        let dir = tempfile::tempdir().unwrap();
        let wav_path = dir.path().join("utt.wav");
        write_sine_wav(&wav_path, 22050, 8192);

        let config = PrepConfig {
            n_fft: 512,
            hop_length: 128,
            win_length: 512,
            num_mels: 40,
            voc_mode: VocoderMode::ContinuousMixture,
            mu_law: true,
            bits: 9,
            ignore_tts: true,
            ..Default::default()
        };
        let paths = Paths::new(dir.path().join("data"));
        paths.ensure().unwrap();
        let pipeline = Pipeline::new(config, paths).unwrap();
        assert_eq!(pipeline.quantizer(), Quantizer::Linear { bits: 16 });

        pipeline.process(&wav_path).unwrap();
        let quant_file = File::open(dir.path().join("data/quant/utt.npy")).unwrap();
        let quant: Array1<i64> = Array1::read_npy(quant_file).unwrap();
        // a 0.4-amplitude sine must use far more than 9 bits of range
        let max = quant.iter().copied().max().unwrap();
        assert!(max > 512, "max label {} looks like 9-bit output", max);
    }
}
