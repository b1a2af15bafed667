//! Mel-scaled log-magnitude spectrogram
//!
//! STFT framing follows the centered convention: the signal is reflect-padded
//! by `n_fft / 2` on each side, so a waveform of length `L` always yields
//! exactly `L / hop_length + 1` frames. The filterbank uses the Slaney mel
//! scale with area normalization, matching `librosa.filters.mel` defaults.

use crate::config::PrepConfig;
use crate::core::Waveform;
use crate::error::PrepResult;
use ndarray::Array2;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Magnitude floor applied before the log, keeping silence finite
const MIN_LEVEL: f32 = 1e-5;

/// Mel spectrogram extractor
///
/// Construction precomputes the analysis window, the mel filterbank and the
/// FFT plan; [`MelSpectrogram::transform`] is then pure and can be shared
/// across worker threads by reference.
pub struct MelSpectrogram {
    n_fft: usize,
    hop_length: usize,
    num_mels: usize,
    min_level_db: f32,
    ref_level_db: f32,
    symmetric: bool,
    preemphasis: Option<f32>,
    /// Hann window of `win_length`, centered and zero-padded to `n_fft`
    window: Vec<f32>,
    /// Filterbank, shape (num_mels, n_fft / 2 + 1)
    mel_basis: Array2<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl MelSpectrogram {
    /// Build an extractor for the given hyperparameters
    pub fn new(config: &PrepConfig) -> PrepResult<Self> {
        config.validate()?;

        let window = padded_hann(config.win_length, config.n_fft);
        let mel_basis = mel_filterbank(
            config.sample_rate,
            config.n_fft,
            config.num_mels,
            config.fmin,
            config.fmax(),
        );
        let fft = FftPlanner::new().plan_fft_forward(config.n_fft);

        Ok(MelSpectrogram {
            n_fft: config.n_fft,
            hop_length: config.hop_length,
            num_mels: config.num_mels,
            min_level_db: config.min_level_db,
            ref_level_db: config.ref_level_db,
            symmetric: config.symmetric_mels,
            preemphasis: config.preemphasis.then_some(config.preemphasis_coef),
            window,
            mel_basis,
            fft,
        })
    }

    /// Number of frames produced for a waveform of `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        len / self.hop_length + 1
    }

    /// Number of mel bands per frame
    pub fn num_mels(&self) -> usize {
        self.num_mels
    }

    /// Compute the normalized log-mel spectrogram, shape (num_mels, n_frames)
    pub fn transform(&self, wav: &Waveform) -> Array2<f32> {
        let samples = match self.preemphasis {
            Some(coef) => preemphasize(wav.samples(), coef),
            None => wav.samples().to_vec(),
        };

        let magnitudes = self.stft_magnitude(&samples);
        let mut mel = self.mel_basis.dot(&magnitudes);

        mel.mapv_inplace(|m| {
            let db = 20.0 * m.max(MIN_LEVEL).log10() - self.ref_level_db;
            let norm = ((db - self.min_level_db) / -self.min_level_db).clamp(0.0, 1.0);
            if self.symmetric {
                2.0 * norm - 1.0
            } else {
                norm
            }
        });
        mel
    }

    /// The normalized value an all-zero frame maps to
    pub fn min_normalized_level(&self) -> f32 {
        if self.symmetric {
            -1.0
        } else {
            0.0
        }
    }

    /// Centered STFT magnitude, shape (n_fft / 2 + 1, n_frames)
    fn stft_magnitude(&self, samples: &[f32]) -> Array2<f32> {
        let n_freqs = self.n_fft / 2 + 1;
        let n_frames = self.frame_count(samples.len());
        let padded = reflect_pad(samples, self.n_fft / 2);

        let mut magnitudes = Array2::zeros((n_freqs, n_frames));
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.n_fft];

        for frame in 0..n_frames {
            let start = frame * self.hop_length;
            for (j, slot) in buffer.iter_mut().enumerate() {
                let sample = padded.get(start + j).copied().unwrap_or(0.0);
                *slot = Complex::new(sample * self.window[j], 0.0);
            }
            self.fft.process(&mut buffer);

            for (bin, value) in buffer.iter().take(n_freqs).enumerate() {
                magnitudes[(bin, frame)] = value.norm();
            }
        }

        magnitudes
    }
}

/// First-order high-pass: `y[n] = x[n] - coef * x[n-1]`
fn preemphasize(samples: &[f32], coef: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len());
    let mut prev = 0.0f32;
    for &s in samples {
        out.push(s - coef * prev);
        prev = s;
    }
    out
}

/// Reflect-pad a signal by `pad` samples on each side
///
/// Mirror indices are clamped so signals shorter than the pad still work.
fn reflect_pad(samples: &[f32], pad: usize) -> Vec<f32> {
    let len = samples.len();
    if len == 0 {
        return vec![0.0; 2 * pad];
    }
    let mut padded = Vec::with_capacity(len + 2 * pad);
    for i in (1..=pad).rev() {
        padded.push(samples[i.min(len - 1)]);
    }
    padded.extend_from_slice(samples);
    for i in 0..pad {
        let idx = len.saturating_sub(2 + i).min(len - 1);
        padded.push(samples[idx]);
    }
    padded
}

/// Hann window of `win_length`, centered inside an `n_fft` frame
fn padded_hann(win_length: usize, n_fft: usize) -> Vec<f32> {
    let offset = (n_fft - win_length) / 2;
    let mut window = vec![0.0f32; n_fft];
    for i in 0..win_length {
        window[offset + i] = 0.5 * (1.0 - (2.0 * PI * i as f32 / win_length as f32).cos());
    }
    window
}

/// Hz to mel, Slaney scale: linear below 1 kHz, logarithmic above
fn hz_to_mel(f: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    const LOGSTEP: f32 = 0.068_751_74; // ln(6.4) / 27

    if f < MIN_LOG_HZ {
        f / F_SP
    } else {
        MIN_LOG_MEL + (f / MIN_LOG_HZ).ln() / LOGSTEP
    }
}

/// Mel to Hz, inverse of [`hz_to_mel`]
fn mel_to_hz(m: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    const LOGSTEP: f32 = 0.068_751_74; // ln(6.4) / 27

    if m < MIN_LOG_MEL {
        m * F_SP
    } else {
        MIN_LOG_HZ * ((m - MIN_LOG_MEL) * LOGSTEP).exp()
    }
}

/// Triangular mel filterbank with Slaney area normalization,
/// shape (num_mels, n_fft / 2 + 1)
fn mel_filterbank(sample_rate: u32, n_fft: usize, num_mels: usize, fmin: f32, fmax: f32) -> Array2<f32> {
    let n_freqs = n_fft / 2 + 1;

    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);
    let hz_points: Vec<f32> = (0..num_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f32 / (num_mels + 1) as f32))
        .collect();

    let mut basis = Array2::zeros((num_mels, n_freqs));
    let bin_hz = sample_rate as f32 / n_fft as f32;

    for band in 0..num_mels {
        let (lower, center, upper) = (hz_points[band], hz_points[band + 1], hz_points[band + 2]);
        // area normalization keeps per-band energy roughly constant
        let enorm = 2.0 / (upper - lower);

        for bin in 0..n_freqs {
            let freq = bin as f32 * bin_hz;
            let weight = if freq >= lower && freq <= center && center > lower {
                (freq - lower) / (center - lower)
            } else if freq > center && freq <= upper && upper > center {
                (upper - freq) / (upper - center)
            } else {
                0.0
            };
            basis[(band, bin)] = weight * enorm;
        }
    }

    basis
}
