//! `ccgm-unpack` — converts a bitstream back into a textual configuration.

use std::fs;
use std::path::PathBuf;
use std::process;

use ccgm_bitstream::Bitstream;
use ccgm_config::ChipConfig;
use clap::Parser;

/// CCGM1A bitstream to text config converter.
#[derive(Parser, Debug)]
#[command(name = "ccgm-unpack", version, about = "CCGM1A bitstream unpacker")]
struct Cli {
    /// Input bitstream file.
    input: PathBuf,

    /// Output textual configuration.
    output: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> i32 {
    let bytes = match fs::read(&cli.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to open input file: {e}");
            return 1;
        }
    };
    let bitstream = Bitstream::from_bytes(bytes);
    if cli.verbose {
        eprintln!("bitstream size: {} bits", bitstream.len() * 8);
    }

    let chip = match bitstream.decode() {
        Ok(chip) => chip,
        Err(e) => {
            eprintln!("Failed to process input bitstream: {e}");
            return 1;
        }
    };
    let config = match ChipConfig::from_chip(&chip) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to process input bitstream: {e}");
            return 1;
        }
    };
    if cli.verbose {
        eprintln!("device: {}", chip.name());
        eprintln!(
            "tiles: {}, brams: {}, bram inits: {}",
            config.tiles.len(),
            config.brams.len(),
            config.bram_data.len()
        );
    }

    if let Err(e) = fs::write(&cli.output, config.to_string()) {
        eprintln!("Failed to open output file: {e}");
        return 1;
    }
    0
}

fn main() {
    let cli = Cli::parse();
    process::exit(run(&cli));
}
