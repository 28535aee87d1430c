//! Bencode decoding and encoding ([BEP-3]).
//!
//! Bencode is the self-describing, length-prefixed format used for `.torrent`
//! manifests and tracker responses.
//!
//! # Data Types
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! # Decoding
//!
//! [`decode`] parses the first value in a buffer and ignores anything after
//! it. [`decode_strict`] additionally requires the buffer to be fully
//! consumed. For finer control, including the nesting limit, use [`Decoder`].
//!
//! ```
//! use rbencode::bencode::{decode, Value};
//!
//! let value = decode(b"d4:infod6:lengthi1024e4:name8:file.txtee").unwrap();
//! let info = value.get(b"info").unwrap();
//! assert_eq!(info.get(b"length").and_then(Value::as_integer), Some(1024));
//! assert_eq!(info.get(b"name").and_then(Value::as_str), Some("file.txt"));
//! ```
//!
//! Integers are 64-bit; tokens outside that range are rejected rather than
//! wrapped:
//!
//! ```
//! use rbencode::bencode::{decode, BencodeError, Value};
//!
//! assert_eq!(decode(b"i9223372036854775807e").unwrap(), Value::Integer(i64::MAX));
//! assert!(matches!(
//!     decode(b"i9223372036854775808e"),
//!     Err(BencodeError::InvalidInteger(_))
//! ));
//! ```
//!
//! Dictionary keys may appear in any order. When a key repeats, the last
//! value wins.
//!
//! # Encoding
//!
//! ```
//! use rbencode::bencode::{decode, encode};
//!
//! let value = decode(b"d1:bi2e1:ai1ee").unwrap();
//! assert_eq!(encode(&value).unwrap(), b"d1:ai1e1:bi2ee");
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{
    decode, decode_prefix, decode_strict, Decoder, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT,
};
pub use encode::{encode, encode_to};
pub use error::BencodeError;
pub use value::Value;
