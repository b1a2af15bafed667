//! wavprep command line interface
//!
//! Preprocesses a corpus of audio files into mel spectrograms and quantized
//! waveforms for vocoder and acoustic-model training.

use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::thread::available_parallelism;
use wavprep::{preprocess, PrepConfig};

#[derive(Parser)]
#[command(name = "wavprep")]
#[command(about = "Preprocess audio into mel spectrograms and quantized waveforms", long_about = None)]
#[command(version)]
struct Cli {
    /// Dataset path (overrides wav_path from the config file)
    #[arg(short, long, value_name = "DIR")]
    path: Option<PathBuf>,

    /// File extension to search for in the dataset folder (default .wav)
    #[arg(short, long, value_name = "EXT")]
    extension: Option<String>,

    /// Number of worker threads
    #[arg(short = 'w', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    num_workers: Option<u32>,

    /// Hyperparameter file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    info!("wavprep {}", wavprep::VERSION);

    let mut config = match &cli.config_file {
        Some(path) => PrepConfig::from_file(path)?,
        None => PrepConfig::default(),
    };
    if let Some(path) = cli.path {
        config.wav_path = path;
    }
    if let Some(extension) = cli.extension {
        config.extension = extension;
    }

    // leave one unit of capacity for the controlling process
    let num_workers = match cli.num_workers {
        Some(n) => n as usize,
        None => available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1),
    };

    info!(
        "sample rate {} | bits {} | mu-law {} | hop {} | workers {}",
        config.sample_rate, config.bits, config.mu_law, config.hop_length, num_workers
    );

    let manifest = preprocess(&config, num_workers)?;

    if !manifest.is_empty() {
        println!(
            "Completed. {} utterances written to \"{}\".",
            manifest.len(),
            config.data_path.display()
        );
    }

    Ok(())
}
