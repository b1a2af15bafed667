//! Signal processing: spectral transform and amplitude quantization

pub mod mel;
pub mod quant;

pub use mel::MelSpectrogram;
pub use quant::Quantizer;
