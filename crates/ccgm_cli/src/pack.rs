//! `ccgm-pack` — packs a textual device configuration into a bitstream.

use std::fs;
use std::path::PathBuf;
use std::process;

use ccgm_bitstream::{Bitstream, BitstreamError, BitstreamOptions, CrcMode, SpiMode};
use ccgm_config::ChipConfig;
use clap::{Parser, ValueEnum};

/// CCGM1A bitstream packer.
#[derive(Parser, Debug)]
#[command(name = "ccgm-pack", version, about = "CCGM1A bitstream packer")]
struct Cli {
    /// Input textual configuration.
    input: PathBuf,

    /// Output bitstream file.
    output: Option<PathBuf>,

    /// Reset all configuration latches with an initial CFGRST.
    #[arg(long)]
    reset: bool,

    /// CRC error behaviour.
    #[arg(long, value_enum)]
    crcmode: Option<CrcModeArg>,

    /// SPI mode to use.
    #[arg(long, value_enum)]
    spimode: Option<SpiModeArg>,

    /// Enable reconfiguration in the bitstream.
    #[arg(long)]
    reconfig: bool,

    /// Enable background reconfiguration in the bitstream.
    #[arg(long)]
    background: bool,

    /// Boot address for a secondary bitstream.
    #[arg(long)]
    bootaddr: Option<u32>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

/// CRC error behaviour flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CrcModeArg {
    /// Verify CRCs and stop on mismatch.
    Check,
    /// Keep CRC bytes but ignore mismatches.
    Ignore,
    /// Omit CRC bytes entirely.
    Unused,
}

impl From<CrcModeArg> for CrcMode {
    fn from(arg: CrcModeArg) -> Self {
        match arg {
            CrcModeArg::Check => CrcMode::Check,
            CrcModeArg::Ignore => CrcMode::Ignore,
            CrcModeArg::Unused => CrcMode::Unused,
        }
    }
}

/// SPI bus width flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SpiModeArg {
    /// Single-lane SPI.
    Single,
    /// Dual-lane SPI.
    Dual,
    /// Quad-lane SPI.
    Quad,
}

impl From<SpiModeArg> for SpiMode {
    fn from(arg: SpiModeArg) -> Self {
        match arg {
            SpiModeArg::Single => SpiMode::Single,
            SpiModeArg::Dual => SpiMode::Dual,
            SpiModeArg::Quad => SpiMode::Quad,
        }
    }
}

fn options_from_cli(cli: &Cli) -> BitstreamOptions {
    BitstreamOptions {
        reset: cli.reset,
        crc_mode: cli.crcmode.map(CrcMode::from),
        spi_mode: cli.spimode.map(SpiMode::from),
        reconfig: cli.reconfig,
        background: cli.background,
        boot_addr: cli.bootaddr,
    }
}

fn run(cli: &Cli) -> i32 {
    let text = match fs::read_to_string(&cli.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Failed to open input file: {e}");
            return 1;
        }
    };

    let config: ChipConfig = match text.parse() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to process input config: {e}");
            return 1;
        }
    };
    let chip = match config.to_chip() {
        Ok(chip) => chip,
        Err(e) => {
            eprintln!("Failed to process input config: {e}");
            return 1;
        }
    };

    let bitstream = Bitstream::encode(&chip, &options_from_cli(cli));
    if cli.verbose {
        eprintln!("device: {}", chip.name());
        eprintln!("bitstream size: {} bits", bitstream.len() * 8);
    }

    if let Some(path) = &cli.output {
        if let Err(e) = write_output(path, &bitstream) {
            eprintln!("Failed to open output file: {e}");
            return 1;
        }
    }
    0
}

fn write_output(path: &PathBuf, bitstream: &Bitstream) -> Result<(), BitstreamError> {
    let mut file = fs::File::create(path)?;
    bitstream.write_to(&mut file)
}

fn main() {
    let cli = Cli::parse();
    process::exit(run(&cli));
}
