use thiserror::Error;

/// Errors produced while decoding or encoding bencode.
///
/// Each decode variant names the grammar rule that failed. Offsets are byte
/// positions in the input buffer.
#[derive(Debug, Error)]
pub enum BencodeError {
    /// A value was expected but the input was exhausted.
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEnd(usize),

    /// The lookahead byte does not start any bencode value.
    #[error("invalid bencode format: unexpected byte {byte:#04x} at offset {offset}")]
    InvalidFormat { byte: u8, offset: usize },

    /// A sub-parser was entered on a byte other than its leading marker.
    #[error("expected '{expected}' at offset {offset}")]
    ExpectedMarker { expected: char, offset: usize },

    /// Input ended before the integer's `e` terminator.
    #[error("unterminated integer")]
    UnterminatedInteger,

    /// Input ended before the byte string's `:` separator.
    #[error("unterminated string length")]
    UnterminatedLength,

    /// Input ended before the list's `e` terminator.
    #[error("unterminated list")]
    UnterminatedList,

    /// Input ended before the dictionary's `e` terminator.
    #[error("unterminated dictionary")]
    UnterminatedDict,

    /// The integer body is empty, non-numeric, or does not fit in an `i64`.
    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),

    /// The byte string length is empty, negative, or non-numeric.
    #[error("invalid string length: {0:?}")]
    InvalidLength(String),

    /// The declared byte string length runs past the end of the input.
    #[error("string data too short: need {needed} bytes, {available} available")]
    TruncatedData { needed: usize, available: usize },

    /// A dictionary key is not a byte string.
    #[error("dictionary key at offset {0} is not a byte string")]
    InvalidKey(usize),

    /// More containers were open at once than the decoder allows.
    #[error("nesting deeper than {0} levels")]
    DepthExceeded(usize),

    /// Bytes remain after a complete value (strict decoding only).
    #[error("{0} trailing bytes after value")]
    TrailingData(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
