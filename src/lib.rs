#![warn(missing_docs)]

//! # wavprep: vocoder dataset preprocessing
//!
//! Turns a directory of raw audio files into the two per-utterance artifact
//! sets consumed by speech-synthesis training:
//!
//! - a mel-scaled log-magnitude **spectrogram** (`mel/<id>.npy`, f32)
//! - a **quantized signal**, the waveform amplitude encoded to integer
//!   symbols for an autoregressive vocoder (`quant/<id>.npy`, i64)
//!
//! plus a run manifest of `(identifier, frame count)` pairs and an optional
//! transcript index. Files are processed concurrently by a bounded worker
//! pool; artifacts are deterministic per file regardless of scheduling.
//!
//! ## Quick Start
//!
//! ```ignore
//! use wavprep::{preprocess, PrepConfig};
//!
//! let config = PrepConfig::from_file("hparams.json")?;
//! let manifest = preprocess(&config, 4)?;
//! println!("{} utterances ready", manifest.len());
//! ```

/// Hyperparameter configuration
pub mod config;
/// Core audio types
pub mod core;
/// Signal processing: spectral transform and quantization
pub mod dsp;
/// Error types for preprocessing operations
pub mod error;
/// Waveform loading
pub mod loader;
/// Output directory layout
pub mod paths;
/// Per-file conversion and batch orchestration
pub mod pipeline;
/// Transcript extraction recipes
pub mod text;

pub use config::{PrepConfig, VocoderMode};
pub use self::core::Waveform;
pub use dsp::{MelSpectrogram, Quantizer};
pub use error::{PrepError, PrepResult};
pub use paths::Paths;
pub use pipeline::{find_files, preprocess, ManifestEntry, Pipeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
