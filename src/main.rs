/// kbcdump - Kernel Bytecode Disassembler CLI
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use kbc::config::parse_offset;
use kbc::{disassemble, BytecodeChunk, ContainerHeader, DisasmConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Disassemble a kernel bytecode stream
#[derive(Parser, Debug)]
#[command(name = "kbcdump", version, about)]
struct Cli {
    /// Input bytecode file (use '-' for stdin)
    input: String,

    /// Disassembler config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate and skip a container header (magic + version) first
    #[arg(long)]
    header: bool,

    /// Print raw instruction bytes
    #[arg(long)]
    bytes: bool,

    /// Base offset added to printed offsets (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_base_offset)]
    offset: Option<u64>,
}

fn parse_base_offset(raw: &str) -> Result<u64, String> {
    parse_offset(raw).ok_or_else(|| format!("invalid offset '{}'", raw))
}

fn read_input(input: &str) -> Result<Vec<u8>, String> {
    if input == "-" {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(buffer)
    } else {
        fs::read(input).map_err(|e| format!("Failed to read file '{}': {}", input, e))
    }
}

fn load_config(cli: &Cli) -> Result<DisasmConfig, String> {
    let config = match &cli.config {
        Some(path) => DisasmConfig::load_from_toml_path(path).map_err(|e| e.to_string())?,
        None => DisasmConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if cli.bytes {
        config.show_bytes = true;
    }
    if let Some(offset) = cli.offset {
        config.base_offset = offset;
    }
    Ok(config)
}

/// Produce the listing; a decode error still prints what was decoded.
fn run(cli: &Cli) -> Result<(String, bool), String> {
    let config = load_config(cli)?;
    let data = read_input(&cli.input)?;

    let code = if cli.header {
        let header = ContainerHeader::read(&data).map_err(|e| e.to_string())?;
        debug!(target: "kbc::cli", version = header.version, "Container header accepted");
        ContainerHeader::payload(&data)
    } else {
        &data[..]
    };

    let chunk = BytecodeChunk::new(code);
    let listing = disassemble(&chunk, &config);
    let failed = chunk.instructions().any(|instr| instr.is_err());
    Ok((listing, failed))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(target: "kbc::cli", input = %cli.input, "Starting kbcdump");

    match run(&cli) {
        Ok((listing, failed)) => {
            print!("{}", listing);
            if failed {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
