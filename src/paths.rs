//! Output directory layout

use crate::error::PrepResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the run writes its artifacts
///
/// One spectrogram and one quantized signal per utterance, plus the run-level
/// manifest and optional transcript index under the data root.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root for manifest and transcript index
    pub data: PathBuf,
    /// Mel spectrogram arrays, `<id>.npy`
    pub mel: PathBuf,
    /// Quantized signal arrays, `<id>.npy`
    pub quant: PathBuf,
}

impl Paths {
    /// Derive the layout from the configured data root
    pub fn new<P: AsRef<Path>>(data_root: P) -> Self {
        let data = data_root.as_ref().to_path_buf();
        Paths {
            mel: data.join("mel"),
            quant: data.join("quant"),
            data,
        }
    }

    /// Create all output directories
    pub fn ensure(&self) -> PrepResult<()> {
        fs::create_dir_all(&self.data)?;
        fs::create_dir_all(&self.mel)?;
        fs::create_dir_all(&self.quant)?;
        Ok(())
    }

    /// Path of the mel artifact for an utterance
    pub fn mel_file(&self, id: &str) -> PathBuf {
        self.mel.join(format!("{}.npy", id))
    }

    /// Path of the quantized-signal artifact for an utterance
    pub fn quant_file(&self, id: &str) -> PathBuf {
        self.quant.join(format!("{}.npy", id))
    }

    /// Path of the run manifest
    pub fn dataset_file(&self) -> PathBuf {
        self.data.join("dataset.json")
    }

    /// Path of the transcript index
    pub fn text_dict_file(&self) -> PathBuf {
        self.data.join("text_dict.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = Paths::new("/tmp/out");
        assert_eq!(paths.mel_file("LJ001-0001"), PathBuf::from("/tmp/out/mel/LJ001-0001.npy"));
        assert_eq!(
            paths.quant_file("LJ001-0001"),
            PathBuf::from("/tmp/out/quant/LJ001-0001.npy")
        );
        assert_eq!(paths.dataset_file(), PathBuf::from("/tmp/out/dataset.json"));
    }

    #[test]
    fn test_ensure_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::new(dir.path().join("data"));
        paths.ensure().unwrap();
        assert!(paths.mel.is_dir());
        assert!(paths.quant.is_dir());
    }
}
