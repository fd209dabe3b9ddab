use anyhow::{Context, Result};
use clap::Parser;
use fileseq::find_sequence_on_disk;
use std::path::PathBuf;

/// List the image file sequences under a directory.
///
/// Prints a sorted union of compact sequence specs and the filenames that
/// belong to no sequence.
#[derive(Parser)]
#[command(name = "seqls", version, about = "List frame-numbered file sequences in a directory tree")]
struct Cli {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Skip hidden files and directories
    #[arg(long)]
    no_hidden: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let (sequences, nonsequences) = find_sequence_on_disk(&cli.path, !cli.no_hidden)
        .with_context(|| format!("failed to scan {:?}", cli.path))?;

    let mut lines: Vec<String> = sequences.iter().map(ToString::to_string).collect();
    lines.extend(nonsequences);
    lines.sort();

    for line in lines {
        println!("{line}");
    }
    Ok(())
}
