use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors that can occur when mapping a decoded manifest.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The manifest is not valid bencode.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required field is missing.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field has the wrong type or an out-of-range value.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// A hex info hash has the wrong length or non-hex characters.
    #[error("invalid info hash")]
    InvalidInfoHash,
}
