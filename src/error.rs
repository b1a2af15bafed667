use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for preprocessing operations
pub type PrepResult<T> = Result<T, PrepError>;

/// Error types for the preprocessing pipeline
#[derive(Error, Debug)]
pub enum PrepError {
    /// IO error (file operations, disk access)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid or inconsistent hyperparameter configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Audio file does not match the configured format
    #[error("Format error in {}: {detail}", path.display())]
    Format {
        /// File that failed the format check
        path: PathBuf,
        /// What was wrong with it
        detail: String,
    },

    /// Decoding failed
    #[error("Decode error: {0}")]
    Decode(String),

    /// Writing an output artifact failed
    #[error("Write error: {0}")]
    Write(String),

    /// A per-file pipeline failure, tagged with the offending input file
    #[error("Failed to process {}: {source}", path.display())]
    File {
        /// Input file the pipeline was working on
        path: PathBuf,
        /// Underlying failure
        source: Box<PrepError>,
    },
}

impl PrepError {
    /// Wrap an error with the input file it occurred on
    pub fn for_file(path: impl Into<PathBuf>, source: PrepError) -> Self {
        PrepError::File {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl From<symphonia::core::errors::Error> for PrepError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        PrepError::Decode(err.to_string())
    }
}

impl From<hound::Error> for PrepError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => PrepError::Io(e),
            e => PrepError::Decode(e.to_string()),
        }
    }
}
