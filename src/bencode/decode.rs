use super::error::BencodeError;
use super::value::Value;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::mem;

/// Default limit on how many lists and dictionaries may be open at once.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Upper bound for [`Decoder::with_max_depth`]. Larger limits are clamped.
///
/// Decoding itself never recurses, but the derived `Clone`, `PartialEq` and
/// `Debug` impls of [`Value`] do, so decoded trees are kept shallow enough for
/// them to run on a default thread stack.
pub const MAX_DEPTH_LIMIT: usize = 1024;

/// Decodes the first bencode value in `data`.
///
/// Bytes following the first complete value are ignored; use
/// [`decode_strict`] to reject them.
///
/// # Errors
///
/// Returns the [`BencodeError`] of the first grammar rule that failed.
///
/// # Examples
///
/// ```
/// use rbencode::bencode::{decode, Value};
///
/// assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
/// assert_eq!(decode(b"i42etrailing").unwrap(), Value::Integer(42));
/// assert!(decode(b"i42").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    Decoder::new(data).decode_value()
}

/// Decodes `data` as exactly one bencode value.
///
/// # Errors
///
/// Same as [`decode`], plus [`BencodeError::TrailingData`] when bytes remain
/// after the value.
///
/// ```
/// use rbencode::bencode::{decode_strict, BencodeError};
///
/// assert!(decode_strict(b"le").is_ok());
/// assert!(matches!(decode_strict(b"lee"), Err(BencodeError::TrailingData(1))));
/// ```
pub fn decode_strict(data: &[u8]) -> Result<Value, BencodeError> {
    let mut decoder = Decoder::new(data);
    let value = decoder.decode_value()?;
    decoder.finish()?;
    Ok(value)
}

/// Decodes the first value in `data` and returns it with the number of bytes
/// it occupied.
pub fn decode_prefix(data: &[u8]) -> Result<(Value, usize), BencodeError> {
    let mut decoder = Decoder::new(data);
    let value = decoder.decode_value()?;
    Ok((value, decoder.position()))
}

/// A container that has been opened but not yet closed.
enum Frame {
    List(Vec<Value>),
    Dict {
        entries: BTreeMap<Bytes, Value>,
        key: Bytes,
    },
}

impl Frame {
    fn push(&mut self, value: Value) {
        match self {
            Frame::List(items) => items.push(value),
            // Later duplicates replace earlier ones.
            Frame::Dict { entries, key } => {
                entries.insert(mem::take(key), value);
            }
        }
    }

    fn unterminated(&self) -> BencodeError {
        match self {
            Frame::List(_) => BencodeError::UnterminatedList,
            Frame::Dict { .. } => BencodeError::UnterminatedDict,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Frame::List(items) => Value::List(items),
            Frame::Dict { entries, .. } => Value::Dict(entries),
        }
    }
}

/// A read cursor over a bencode buffer.
///
/// The buffer and the position are only ever set together by the
/// constructors; a decoder is meant to be used for a single input.
///
/// Nested lists and dictionaries are tracked on a heap-allocated stack rather
/// than the call stack, so adversarial nesting cannot overflow the thread's
/// stack. The nesting limit is configurable with [`Decoder::with_max_depth`]
/// up to [`MAX_DEPTH_LIMIT`].
///
/// # Examples
///
/// ```
/// use rbencode::bencode::Decoder;
///
/// let mut decoder = Decoder::new(b"i7e4:spam");
/// assert_eq!(decoder.decode_integer().unwrap(), 7);
/// assert_eq!(decoder.decode_bytes().unwrap().as_ref(), b"spam");
/// assert!(decoder.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder positioned at the start of `data` with the default
    /// nesting limit.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_max_depth(data, DEFAULT_MAX_DEPTH)
    }

    /// Creates a decoder that fails with [`BencodeError::DepthExceeded`] once
    /// more than `max_depth` containers are open at the same time.
    ///
    /// `max_depth` is clamped to [`MAX_DEPTH_LIMIT`].
    pub fn with_max_depth(data: &'a [u8], max_depth: usize) -> Self {
        Self {
            data,
            pos: 0,
            max_depth: max_depth.min(MAX_DEPTH_LIMIT),
        }
    }

    /// The nesting limit in effect.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Byte offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails with [`BencodeError::TrailingData`] if any input is left unread.
    pub fn finish(&self) -> Result<(), BencodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(BencodeError::TrailingData(n)),
        }
    }

    /// Decodes one complete value, dispatching on the lookahead byte.
    pub fn decode_value(&mut self) -> Result<Value, BencodeError> {
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            let mut completed = match self.peek() {
                None => return Err(BencodeError::UnexpectedEnd(self.pos)),
                Some(b'i') => Some(Value::Integer(self.decode_integer()?)),
                Some(b'0'..=b'9') => Some(Value::Bytes(self.decode_bytes()?)),
                Some(b'l') => {
                    self.open(stack.len())?;
                    stack.push(Frame::List(Vec::new()));
                    None
                }
                Some(b'd') => {
                    self.open(stack.len())?;
                    stack.push(Frame::Dict {
                        entries: BTreeMap::new(),
                        key: Bytes::new(),
                    });
                    None
                }
                Some(byte) => {
                    return Err(BencodeError::InvalidFormat {
                        byte,
                        offset: self.pos,
                    })
                }
            };

            // Attach finished values to their parents and close containers
            // until the next element or key has to be read.
            loop {
                let frame = match (completed.take(), stack.last_mut()) {
                    (Some(value), None) => return Ok(value),
                    (Some(value), Some(frame)) => {
                        frame.push(value);
                        frame
                    }
                    (None, Some(frame)) => frame,
                    (None, None) => return Err(BencodeError::UnexpectedEnd(self.pos)),
                };

                match self.peek() {
                    None => return Err(frame.unterminated()),
                    Some(b'e') => {
                        self.pos += 1;
                        completed = stack.pop().map(Frame::into_value);
                    }
                    Some(_) => {
                        if let Frame::Dict { key, .. } = frame {
                            *key = self.decode_key()?;
                        }
                        break;
                    }
                }
            }
        }
    }

    /// Decodes an integer token `i<digits>e`.
    pub fn decode_integer(&mut self) -> Result<i64, BencodeError> {
        self.expect(b'i')?;
        let start = self.pos + 1;
        let end = self
            .find(start, b'e')
            .ok_or(BencodeError::UnterminatedInteger)?;

        let body = &self.data[start..end];
        let value = std::str::from_utf8(body)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| BencodeError::InvalidInteger(String::from_utf8_lossy(body).into()))?;

        self.pos = end + 1;
        Ok(value)
    }

    /// Decodes a byte string token `<length>:<bytes>`.
    pub fn decode_bytes(&mut self) -> Result<Bytes, BencodeError> {
        let start = self.pos;
        let colon = self
            .find(start, b':')
            .ok_or(BencodeError::UnterminatedLength)?;

        let run = &self.data[start..colon];
        let len = Some(run)
            .filter(|r| !r.is_empty() && r.iter().all(u8::is_ascii_digit))
            .and_then(|r| std::str::from_utf8(r).ok())
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| BencodeError::InvalidLength(String::from_utf8_lossy(run).into()))?;

        let payload = colon + 1;
        let available = self.data.len() - payload;
        if len > available {
            return Err(BencodeError::TruncatedData {
                needed: len,
                available,
            });
        }

        let bytes = Bytes::copy_from_slice(&self.data[payload..payload + len]);
        self.pos = payload + len;
        Ok(bytes)
    }

    /// Decodes a list token `l<value>*e`.
    pub fn decode_list(&mut self) -> Result<Vec<Value>, BencodeError> {
        self.expect(b'l')?;
        let offset = self.pos;
        self.decode_value()?
            .into_list()
            .ok_or(BencodeError::ExpectedMarker {
                expected: 'l',
                offset,
            })
    }

    /// Decodes a dictionary token `d<key><value>*e`.
    pub fn decode_dict(&mut self) -> Result<BTreeMap<Bytes, Value>, BencodeError> {
        self.expect(b'd')?;
        let offset = self.pos;
        self.decode_value()?
            .into_dict()
            .ok_or(BencodeError::ExpectedMarker {
                expected: 'd',
                offset,
            })
    }

    /// Consumes the `d` that opens a dictionary, for reading it entry by
    /// entry with [`Decoder::next_key`] and [`Decoder::decode_value`].
    ///
    /// The cursor then sits on each value, so callers can record the exact
    /// source span of an entry.
    ///
    /// ```
    /// use rbencode::bencode::Decoder;
    ///
    /// let data = b"d1:bi2e1:ai1ee";
    /// let mut decoder = Decoder::new(data);
    /// decoder.begin_dict().unwrap();
    /// assert_eq!(decoder.next_key().unwrap().unwrap().as_ref(), b"b");
    /// let start = decoder.position();
    /// decoder.decode_value().unwrap();
    /// assert_eq!(&data[start..decoder.position()], b"i2e");
    /// assert_eq!(decoder.next_key().unwrap().unwrap().as_ref(), b"a");
    /// decoder.decode_value().unwrap();
    /// assert_eq!(decoder.next_key().unwrap(), None);
    /// assert!(decoder.is_empty());
    /// ```
    pub fn begin_dict(&mut self) -> Result<(), BencodeError> {
        self.expect(b'd')?;
        self.pos += 1;
        Ok(())
    }

    /// Reads the next key of a dictionary opened with
    /// [`Decoder::begin_dict`], or consumes the closing `e` and returns
    /// `None`.
    pub fn next_key(&mut self) -> Result<Option<Bytes>, BencodeError> {
        match self.peek() {
            None => Err(BencodeError::UnterminatedDict),
            Some(b'e') => {
                self.pos += 1;
                Ok(None)
            }
            Some(_) => self.decode_key().map(Some),
        }
    }

    fn decode_key(&mut self) -> Result<Bytes, BencodeError> {
        match self.peek() {
            Some(b'0'..=b'9') => self.decode_bytes(),
            _ => Err(BencodeError::InvalidKey(self.pos)),
        }
    }

    fn open(&mut self, depth: usize) -> Result<(), BencodeError> {
        if depth >= self.max_depth {
            return Err(BencodeError::DepthExceeded(self.max_depth));
        }
        self.pos += 1;
        Ok(())
    }

    /// Checks that the current byte is `marker` without consuming it.
    fn expect(&self, marker: u8) -> Result<(), BencodeError> {
        match self.peek() {
            Some(b) if b == marker => Ok(()),
            Some(_) => Err(BencodeError::ExpectedMarker {
                expected: marker as char,
                offset: self.pos,
            }),
            None => Err(BencodeError::UnexpectedEnd(self.pos)),
        }
    }

    fn find(&self, from: usize, needle: u8) -> Option<usize> {
        self.data
            .get(from..)?
            .iter()
            .position(|&b| b == needle)
            .map(|i| from + i)
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }
}
