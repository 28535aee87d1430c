//! Download manifest mapping ([BEP-3]).
//!
//! A manifest (`.torrent` file) is a bencoded dictionary. This module projects
//! a decoded dictionary into typed records and back; it does no parsing of its
//! own beyond checking field types.
//!
//! # Manifest Structure
//!
//! - **announce** - Primary tracker URL
//! - **announce-list** - Additional tracker tiers (BEP-12)
//! - **info** - Content description (hashed to produce the [`InfoHash`])
//!   - `name` - File name, or directory name for multi-file manifests
//!   - `piece length` - Bytes per piece
//!   - `pieces` - Concatenated 20-byte SHA-1 hashes, one per piece
//!   - `length` (single file) OR `files` (list of `length` + `path`)
//!   - `private` - `1` restricts peer discovery to the listed trackers
//!
//! # Examples
//!
//! ```no_run
//! use rbencode::metainfo::Metainfo;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("example.torrent")?;
//! let manifest = Metainfo::from_bytes(&data)?;
//!
//! println!("Name: {}", manifest.info.name);
//! println!("Info hash: {}", manifest.info_hash);
//! for file in &manifest.info.files {
//!     println!("  {} ({} bytes)", file.relative_path().display(), file.length);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod error;
mod info_hash;
mod torrent;

pub use error::MetainfoError;
pub use info_hash::InfoHash;
pub use torrent::{File, FileLayout, Info, Metainfo, PIECE_HASH_LEN};

#[cfg(test)]
mod tests;
