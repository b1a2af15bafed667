//! Waveform amplitude quantization
//!
//! Two encodings are supported: plain linear quantization and mu-law
//! companding, which spends its levels logarithmically so low amplitudes keep
//! more resolution. Which one runs is decided once, from the configuration,
//! by [`Quantizer::for_config`]; the continuous-mixture vocoder always trains
//! against 16-bit linear targets, overriding the mu-law flag.

use crate::config::{PrepConfig, VocoderMode};
use crate::error::{PrepError, PrepResult};

/// Amplitude quantization mode, fixed for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantizer {
    /// Uniform quantization of [-1, 1] into `2^bits` levels
    Linear {
        /// Bit depth, 1..=16
        bits: u32,
    },
    /// Mu-law companding followed by uniform quantization, `mu = 2^bits - 1`
    MuLaw {
        /// Bit depth, 1..=16
        bits: u32,
    },
}

impl Quantizer {
    /// Select the quantizer for a configuration
    ///
    /// The mode-precedence rule lives here and nowhere else: a
    /// continuous-mixture vocoder always gets 16-bit linear targets, even
    /// when mu-law is enabled; a discrete-class vocoder gets mu-law at the
    /// configured bit depth only when asked for, otherwise linear.
    pub fn for_config(config: &PrepConfig) -> PrepResult<Self> {
        let quantizer = match config.voc_mode {
            VocoderMode::ContinuousMixture => Quantizer::Linear { bits: 16 },
            VocoderMode::DiscreteClass if config.mu_law => Quantizer::MuLaw { bits: config.bits },
            VocoderMode::DiscreteClass => Quantizer::Linear { bits: config.bits },
        };
        quantizer.validate()?;
        Ok(quantizer)
    }

    fn validate(&self) -> PrepResult<()> {
        let bits = self.bits();
        if bits == 0 || bits > 16 {
            return Err(PrepError::Config(format!(
                "bit depth must be in 1..=16, got {}",
                bits
            )));
        }
        Ok(())
    }

    /// Bit depth of this quantizer
    pub fn bits(&self) -> u32 {
        match *self {
            Quantizer::Linear { bits } | Quantizer::MuLaw { bits } => bits,
        }
    }

    /// Number of quantization levels, `2^bits`
    pub fn levels(&self) -> u32 {
        1 << self.bits()
    }

    /// Encode samples in [-1, 1] to integer symbols in `[0, 2^bits)`
    pub fn encode(&self, samples: &[f32]) -> Vec<u16> {
        match *self {
            Quantizer::Linear { bits } => {
                let top = ((1u32 << bits) - 1) as f32;
                samples
                    .iter()
                    .map(|&x| (((x + 1.0) / 2.0 * top).round().clamp(0.0, top)) as u16)
                    .collect()
            }
            Quantizer::MuLaw { bits } => {
                let mu = ((1u32 << bits) - 1) as f32;
                samples
                    .iter()
                    .map(|&x| {
                        let x = x.clamp(-1.0, 1.0);
                        let compressed = x.signum() * (1.0 + mu * x.abs()).ln() / (1.0 + mu).ln();
                        (((compressed + 1.0) / 2.0 * mu + 0.5).floor().clamp(0.0, mu)) as u16
                    })
                    .collect()
            }
        }
    }

    /// Decode integer symbols back to samples in [-1, 1]
    pub fn decode(&self, labels: &[u16]) -> Vec<f32> {
        match *self {
            Quantizer::Linear { bits } => {
                let top = ((1u32 << bits) - 1) as f32;
                labels.iter().map(|&y| 2.0 * y as f32 / top - 1.0).collect()
            }
            Quantizer::MuLaw { bits } => {
                let mu = ((1u32 << bits) - 1) as f32;
                labels
                    .iter()
                    .map(|&y| {
                        let f = 2.0 * y as f32 / mu - 1.0;
                        f.signum() / mu * ((1.0 + mu).powf(f.abs()) - 1.0)
                    })
                    .collect()
            }
        }
    }
}
