use clap::Parser;
use log::{debug, error};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use nbtrace::{trace_root, NbtError, WindowBuffer, DEFAULT_CAPACITY};

const EXIT_INVALID_OPTION: u8 = 1;
const EXIT_PREMATURE_EOF: u8 = 2;
const EXIT_DECODE_FAILED: u8 = 3;

#[derive(Parser)]
#[command(name = "nbtrace")]
#[command(about = "Dump an NBT stream as an indented text trace", long_about = None)]
struct Cli {
    /// Bytes to skip before the root tag (decimal, 0x-prefixed hex, or 0-prefixed octal)
    #[arg(value_parser = parse_offset, default_value = "0")]
    skip: u64,

    /// Input file (defaults to standard input)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Size of the read window in bytes
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    window_size: usize,
}

/// Parses an offset the way C's `strtol(text, NULL, 0)` picks a base.
fn parse_offset(text: &str) -> Result<u64, String> {
    let text = text.trim();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        u64::from_str_radix(&text[1..], 8)
    } else {
        text.parse()
    };
    parsed.map_err(|e| format!("Invalid option given: \"{}\" ({})", text, e))
}

/// Reads and drops `count` bytes. Returns how many were actually there.
fn skip_bytes<R: Read>(reader: &mut R, count: u64) -> io::Result<u64> {
    io::copy(&mut reader.by_ref().take(count), &mut io::sink())
}

fn run<R: Read>(reader: R, cli: &Cli) -> Result<(), ExitCode> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = trace_input(reader, cli, &mut out);
    // Flush even on failure: the partial trace shows where decoding stopped.
    let flushed = out.flush().map_err(NbtError::Output);

    match result.and_then(|code| flushed.map(|()| code)) {
        Ok(None) => Ok(()),
        Ok(Some(code)) => Err(ExitCode::from(code)),
        Err(e) => {
            eprintln!("{}", e);
            Err(ExitCode::from(EXIT_DECODE_FAILED))
        }
    }
}

/// Writes the skip banner, the trace and the total. `Some` carries the exit
/// code for a stream that ended while skipping.
fn trace_input<R: Read, W: Write>(
    mut reader: R,
    cli: &Cli,
    out: &mut W,
) -> nbtrace::Result<Option<u8>> {
    writeln!(out, "Skipping 0x{:x} bytes", cli.skip).map_err(NbtError::Output)?;
    let skipped = skip_bytes(&mut reader, cli.skip).map_err(|e| {
        error!("failed to skip leading bytes: {}", e);
        NbtError::SourceReadFailure(e)
    })?;
    if skipped < cli.skip {
        debug!("stream ended after {} of {} skipped bytes", skipped, cli.skip);
        writeln!(out, "Premature end of file").map_err(NbtError::Output)?;
        return Ok(Some(EXIT_PREMATURE_EOF));
    }
    debug!("skipped {} leading bytes", skipped);

    let mut bb = WindowBuffer::with_capacity(reader, cli.window_size);
    let summary = trace_root(&mut bb, &mut *out).map_err(|e| {
        error!("decode failed after {} bytes", bb.consumed());
        e
    })?;
    writeln!(out, "Total NBT structure 0x{:x} bytes", summary.consumed)
        .map_err(NbtError::Output)?;
    Ok(None)
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::from(EXIT_INVALID_OPTION);
        }
        Err(e) => {
            // --help and --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    let result = match cli.input {
        Some(ref path) => match File::open(path) {
            Ok(file) => run(file, &cli),
            Err(e) => {
                eprintln!("Cannot open {}: {}", path.display(), e);
                Err(ExitCode::from(EXIT_INVALID_OPTION))
            }
        },
        None => run(io::stdin().lock(), &cli),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}
