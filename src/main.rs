use clap::Parser;
use piecework::generator::RustGenerator;
use piecework::types::GenerationOptions;
use piecework::{config, output, pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "piecework")]
#[command(about = "Slice images into jigsaw puzzles and publish them")]
#[command(long_about = "\
Slice images into jigsaw puzzles and publish them

Every image becomes one puzzle: its pieces are stored under /puzzles/<id>/
and its record is committed to the metadata store. Cover and frame overlays
for each piece size are generated once and stored under /covers/<size>/ and
/frames/<size>/.

Images that cannot be sliced are skipped; any storage or metadata failure
aborts the run.

Configuration (later wins):
  built-in defaults
  PIECEWORK_<SECTION>_<KEY> environment variables
  ./piecework.local.toml
  ~/.pieceworkrc")]
#[command(version)]
struct Cli {
    /// Images to turn into puzzles
    #[arg(required = true, num_args = 1..)]
    images: Vec<PathBuf>,

    /// Puzzle name (defaults to a title derived from each file name)
    #[arg(short, long)]
    name: Option<String>,

    /// Piece edge length in pixels
    #[arg(short = 'x', long = "piecesize")]
    piece_size: Option<u32>,

    /// Mark the puzzles as private
    #[arg(short, long)]
    private: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    ExitCode::from(exit_status(run(cli)))
}

/// Process exit status for a finished run: 0 on success, 1 after logging the error.
///
/// Skipped images do not count as failure.
fn exit_status(result: Result<(), Box<dyn std::error::Error>>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{e}");
            1
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config()?;
    let generator = RustGenerator::from_config(&config.generator);
    let options = GenerationOptions {
        name: cli.name,
        piece_size: cli.piece_size,
        private: cli.private,
    };

    let summary = pipeline::run(&config, &generator, &cli.images, &options)?;
    output::print_run_summary(&summary);
    Ok(())
}
