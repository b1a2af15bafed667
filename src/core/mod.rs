//! Core audio types

/// Waveform sample container
pub mod waveform;

pub use waveform::Waveform;
