//! `rbencode` - print the contents of a bencoded file.
//!
//! ```text
//! rbencode [OPTIONS] <FILE>
//!
//! Options:
//!       --strict             Reject bytes after the first value
//!       --max-depth <N>      Maximum nesting of lists and dictionaries (at most 1024)
//!   -m, --manifest           Interpret the file as a .torrent manifest
//!   -v, --verbose...         Increase logging verbosity
//!   -q, --quiet...           Decrease logging verbosity
//! ```
//!
//! Errors are written to stderr and the process exits with status 1.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rbencode::bencode::{Decoder, DEFAULT_MAX_DEPTH};
use rbencode::metainfo::{FileLayout, Metainfo};

#[derive(Parser)]
#[command(name = "rbencode", version, about = "Decode and print bencoded files")]
struct Cli {
    /// File to decode.
    file: PathBuf,

    /// Reject bytes after the first value.
    #[arg(long)]
    strict: bool,

    /// Maximum nesting of lists and dictionaries. Clamped to 1024.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Interpret the file as a .torrent manifest and print a summary.
    #[arg(short, long)]
    manifest: bool,

    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .with_writer(std::io::stderr)
        .init();

    let data = std::fs::read(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    tracing::debug!("read {} bytes from {}", data.len(), cli.file.display());

    if cli.manifest {
        print_manifest(&cli.file, &data)
    } else {
        print_value(&cli, &data)
    }
}

fn print_value(cli: &Cli, data: &[u8]) -> anyhow::Result<()> {
    let mut decoder = Decoder::with_max_depth(data, cli.max_depth);
    let value = decoder
        .decode_value()
        .with_context(|| format!("failed to decode {}", cli.file.display()))?;

    if cli.strict {
        decoder
            .finish()
            .with_context(|| format!("failed to decode {}", cli.file.display()))?;
    } else if !decoder.is_empty() {
        tracing::warn!(
            "ignoring {} bytes after offset {}",
            decoder.remaining(),
            decoder.position()
        );
    }

    println!("{}", value);
    Ok(())
}

fn print_manifest(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let manifest = Metainfo::from_bytes(data)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let info = &manifest.info;

    println!("Name:         {}", info.name);
    println!("Info hash:    {}", manifest.info_hash);
    for tracker in manifest.trackers() {
        println!("Tracker:      {}", tracker);
    }
    if let Some(ref comment) = manifest.comment {
        println!("Comment:      {}", comment);
    }
    println!("Piece length: {}", info.piece_length);
    println!("Pieces:       {}", info.piece_count());
    println!("Total size:   {}", info.total_length);
    println!("Private:      {}", info.private);

    if info.layout == FileLayout::Multi {
        println!("Files:");
        for file in &info.files {
            println!(
                "  {} ({} bytes)",
                Path::new(&info.name).join(file.relative_path()).display(),
                file.length
            );
        }
    }

    Ok(())
}
