//! rbencode - Bencode decoding for download manifests
//!
//! This library decodes the compact, length-prefixed bencode format into a
//! tagged [`Value`] tree, and maps decoded `.torrent` manifests into typed
//! records.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 Bencode decoding/encoding
//! - [`metainfo`] - BEP-3 manifest mapping and info hashes

pub mod bencode;
pub mod metainfo;

pub use bencode::{decode, decode_strict, encode, BencodeError, Decoder, Value};
pub use metainfo::{File, FileLayout, Info, InfoHash, Metainfo, MetainfoError};
