//! Word list generator: turns a whitespace-separated dictionary into the
//! bucketed TOML word file the game loads.
//!
//! Usage:
//!   cargo run --bin genwords -- /usr/share/dict/words -o words.toml

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use matype::domain::wordbank::{ingest, CORPUS_CAP};

#[derive(Parser)]
#[command(name = "genwords")]
#[command(about = "Build a MaType word file from a plain-text dictionary")]
struct Args {
    /// Dictionary file, words separated by whitespace
    dict: PathBuf,

    /// Where to write the word file
    #[arg(short, long, default_value = "words.toml")]
    output: PathBuf,

    /// Maximum number of words kept
    #[arg(long, default_value_t = CORPUS_CAP)]
    cap: usize,

    /// Seed for the shuffle, for reproducible word files
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.cap == 0 {
        bail!("--cap must be at least 1");
    }

    let text = fs::read_to_string(&args.dict)
        .with_context(|| format!("failed to read dictionary {}", args.dict.display()))?;

    let mut rng = match args.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let bank = ingest(&text, &mut rng, args.cap);
    if bank.is_empty() {
        bail!("{} contains no purely alphabetic words", args.dict.display());
    }

    fs::write(&args.output, bank.to_toml())
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    log::info!("wrote {} words to {}", bank.len(), args.output.display());
    for (len, bucket) in bank.buckets() {
        println!("  {len:>2} letters: {}", bucket.len());
    }
    println!("{} words -> {}", bank.len(), args.output.display());
    Ok(())
}
