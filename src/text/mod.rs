//! Transcript extraction
//!
//! Corpus-specific recipes that map utterance identifiers to reference text.
//! Only the LJSpeech layout is built in; the corpus format is named in the
//! configuration so other layouts can be added alongside.

use crate::error::{PrepError, PrepResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Build a transcript index for the configured corpus format
pub fn transcript_index<P: AsRef<Path>>(
    corpus_root: P,
    format: &str,
) -> PrepResult<HashMap<String, String>> {
    match format {
        "ljspeech" => ljspeech(corpus_root),
        other => Err(PrepError::Config(format!(
            "unknown corpus format '{}'",
            other
        ))),
    }
}

/// Parse LJSpeech `metadata.csv`: pipe-separated lines of
/// `id|raw text|normalized text`
///
/// The last field wins, so corpora without the normalized column still parse.
pub fn ljspeech<P: AsRef<Path>>(corpus_root: P) -> PrepResult<HashMap<String, String>> {
    let path = corpus_root.as_ref().join("metadata.csv");
    let reader = BufReader::new(File::open(&path)?);

    let mut index = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() < 2 || fields[0].is_empty() {
            continue;
        }
        index.insert(
            fields[0].to_string(),
            fields[fields.len() - 1].to_string(),
        );
    }
    Ok(index)
}
