//! Batch orchestration
//!
//! Discovers the corpus, fans whole per-file pipeline invocations out over a
//! fixed pool of worker threads, and collects the manifest as completions
//! arrive. Workers share nothing mutable: each pulls the next file index off
//! an atomic counter and sends its result down a channel. Completion order is
//! arbitrary and the manifest records it as such.
//!
//! Failure policy is fail-fast: the first per-file error cancels the pool and
//! aborts the run, since a silently partial corpus is worse than a failed one.

use crate::config::PrepConfig;
use crate::error::{PrepError, PrepResult};
use crate::paths::Paths;
use crate::pipeline::convert::{ManifestEntry, Pipeline};
use crate::text;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Recursively collect files matching an extension, sorted by path
///
/// The sorted order gives a stable work list; completion order is still up
/// to the scheduler.
pub fn find_files<P: AsRef<Path>>(root: P, extension: &str) -> PrepResult<Vec<PathBuf>> {
    let wanted = extension.trim_start_matches('.');
    let mut files = Vec::new();
    collect_files(root.as_ref(), wanted, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> PrepResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, extension, out)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(extension))
            .unwrap_or(false)
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Run the whole preprocessing batch
///
/// Returns the manifest in completion order. A zero-file corpus is not an
/// error: guidance is logged and no artifacts are created.
pub fn preprocess(config: &PrepConfig, num_workers: usize) -> PrepResult<Vec<ManifestEntry>> {
    config.validate()?;
    if num_workers == 0 {
        return Err(PrepError::Config(
            "worker count must be at least 1".into(),
        ));
    }

    let files = find_files(&config.wav_path, &config.extension)?;
    info!(
        "{} {} files found in \"{}\"",
        files.len(),
        config.extension.trim_start_matches('.'),
        config.wav_path.display()
    );

    if files.is_empty() {
        warn!("no input files found; point wav_path at your dataset or use --path");
        return Ok(Vec::new());
    }

    let paths = Paths::new(&config.data_path);
    paths.ensure()?;

    if !config.ignore_tts {
        let index = text::transcript_index(&config.wav_path, &config.corpus_format)?;
        let file = BufWriter::new(File::create(paths.text_dict_file())?);
        serde_json::to_writer_pretty(file, &index)
            .map_err(|e| PrepError::Write(e.to_string()))?;
        info!("transcript index written for {} utterances", index.len());
    }

    let pipeline = Pipeline::new(config.clone(), paths.clone())?;
    let manifest = run_pool(&pipeline, &files, num_workers)?;

    let file = BufWriter::new(File::create(paths.dataset_file())?);
    serde_json::to_writer_pretty(file, &manifest)
        .map_err(|e| PrepError::Write(e.to_string()))?;

    info!("completed: {} utterances processed", manifest.len());
    Ok(manifest)
}

/// Fan the file list out over `num_workers` threads and gather results
fn run_pool(
    pipeline: &Pipeline,
    files: &[PathBuf],
    num_workers: usize,
) -> PrepResult<Vec<ManifestEntry>> {
    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let next = AtomicUsize::new(0);
    let cancelled = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<PrepResult<ManifestEntry>>();

    thread::scope(|s| {
        let next = &next;
        let cancelled = &cancelled;

        for _ in 0..num_workers.min(files.len()) {
            let tx = tx.clone();
            s.spawn(move || loop {
                if cancelled.load(Ordering::Relaxed) {
                    break;
                }
                let i = next.fetch_add(1, Ordering::Relaxed);
                if i >= files.len() {
                    break;
                }
                if tx.send(pipeline.process(&files[i])).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut manifest = Vec::with_capacity(files.len());
        for result in rx {
            match result {
                Ok(entry) => {
                    progress.inc(1);
                    manifest.push(entry);
                }
                Err(e) => {
                    // stop handing out new work, then surface the failure
                    cancelled.store(true, Ordering::Relaxed);
                    progress.abandon();
                    return Err(e);
                }
            }
        }
        progress.finish();
        Ok(manifest)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_files_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        for name in ["b.wav", "a.wav", "sub/c.wav", "sub/deeper/d.wav", "sub/skip.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = find_files(dir.path(), ".wav").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files.len(), 4);
        // sorted by full path
        assert_eq!(names, vec!["a.wav", "b.wav", "c.wav", "d.wav"]);
    }

    #[test]
    fn test_find_files_extension_without_dot() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.WAV"), b"x").unwrap();
        assert_eq!(find_files(dir.path(), "wav").unwrap().len(), 1);
    }

    #[test]
    fn test_zero_files_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let config = PrepConfig {
            wav_path: dir.path().join("empty"),
            data_path: dir.path().join("data"),
            ignore_tts: true,
            ..Default::default()
        };
        std::fs::create_dir_all(&config.wav_path).unwrap();

        let manifest = preprocess(&config, 2).unwrap();
        assert!(manifest.is_empty());
        // no artifacts created
        assert!(!config.data_path.exists());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = PrepConfig::default();
        assert!(matches!(preprocess(&config, 0), Err(PrepError::Config(_))));
    }
}
