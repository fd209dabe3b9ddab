use anyhow::Result;
use clap::Parser;
use fileseq::FileSequence;
use log::debug;

/// Expand file sequence specs into concrete filenames.
///
/// Arguments that do not parse as a sequence are printed back verbatim.
#[derive(Parser)]
#[command(name = "seqexpand", version, about = "Expand frame-sequence specs into filenames")]
struct Cli {
    /// Sequence specs, e.g. "image.1-10#.jpg"
    #[arg(required = true)]
    specs: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    for spec in &cli.specs {
        match FileSequence::parse(spec) {
            Ok(sequence) => {
                for filename in sequence.iter() {
                    println!("{filename}");
                }
            }
            Err(err) => {
                debug!("not a sequence ({err}), echoing {spec:?}");
                println!("{spec}");
            }
        }
    }
    Ok(())
}
