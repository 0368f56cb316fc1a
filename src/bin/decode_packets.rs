//! Transmission decoder utility
//! Decodes a hex transmission and prints its version checksum and value

use packet_decoder::formats::load_transmission;
use packet_decoder::packet::{PacketParser, ParseOptions, Summary};
use packet_decoder::BitStream;
use std::env;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

/// JSON output is written recursively, so deeper trees are refused
const JSON_MAX_DEPTH: usize = 1024;

fn print_usage(program: &str) {
    eprintln!("Usage: {} <input.txt | -x HEX> [--json] [--max-depth N]", program);
    eprintln!("\nExamples:");
    eprintln!(
        "  {} input.txt                 # Decode the transmission in input.txt",
        program
    );
    eprintln!(
        "  {} -x 9C0141080250320F1802104A08  # Decode a transmission given inline",
        program
    );
    eprintln!(
        "  {} input.txt --json          # Also dump the packet tree as JSON",
        program
    );
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let format_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(|s| s.as_str()).unwrap_or("decode-packets");

    let mut source = None;
    let mut inline_hex = None;
    let mut dump_json = false;
    let mut options = ParseOptions::default();

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "-x" | "--hex" => {
                let hex = rest
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("{} requires a hex argument", arg))?;
                inline_hex = Some(hex.clone());
            }
            "--json" => dump_json = true,
            "--max-depth" => {
                let depth = rest
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--max-depth requires a number"))?;
                options.max_depth = Some(depth.parse()?);
            }
            "-h" | "--help" => {
                print_usage(program);
                return Ok(());
            }
            path if source.is_none() && !path.starts_with('-') => source = Some(path.to_string()),
            other => {
                print_usage(program);
                anyhow::bail!("Unexpected argument: {}", other);
            }
        }
    }

    let mut stream = match (inline_hex, source) {
        (Some(hex), None) => BitStream::from_hex(hex.trim())?,
        (None, Some(path)) => {
            tracing::info!("Reading transmission: {}", path);
            load_transmission(&path)?
        }
        (Some(_), Some(_)) => {
            print_usage(program);
            anyhow::bail!("Give either a file or -x HEX, not both");
        }
        (None, None) => {
            print_usage(program);
            std::process::exit(1);
        }
    };

    tracing::info!("Decoding {} bits", stream.len());
    let packet = PacketParser::new(options).parse(&mut stream)?;
    let summary = Summary::of(&packet)?;

    println!("version sum: {}", summary.version_sum);
    println!("value: {}", summary.value);

    if dump_json {
        let depth = packet.depth();
        if depth > JSON_MAX_DEPTH {
            anyhow::bail!(
                "Packet tree is {} levels deep, too deep to dump as JSON (limit {})",
                depth,
                JSON_MAX_DEPTH
            );
        }
        println!("{}", serde_json::to_string_pretty(&packet)?);
    }

    Ok(())
}
