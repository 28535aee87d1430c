use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use std::mem;

/// A decoded bencode value.
///
/// Bencode has four data types: integers, byte strings, lists, and dictionaries.
/// Lists and dictionaries own their children.
///
/// Dropping, encoding and displaying a value never recurse, so trees of any
/// depth are safe there. The derived `Clone`, `PartialEq` and `Debug` impls
/// do recurse; decoded trees stay within
/// [`MAX_DEPTH_LIMIT`](super::MAX_DEPTH_LIMIT) levels.
///
/// # Examples
///
/// ```
/// use rbencode::bencode::Value;
///
/// let int: Value = 42i64.into();
/// let string: Value = "hello".into();
/// let list = Value::List(vec![int.clone(), string.clone()]);
///
/// assert_eq!(int.as_integer(), Some(42));
/// assert_eq!(string.as_str(), Some("hello"));
/// assert_eq!(list.as_list().map(|l| l.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A signed 64-bit integer.
    Integer(i64),
    /// A byte string (may or may not be valid UTF-8).
    Bytes(Bytes),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A dictionary keyed by byte strings.
    Dict(BTreeMap<Bytes, Value>),
}

impl Value {
    /// Creates a byte string value from a UTF-8 string.
    pub fn string(s: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Bytes(_) => "byte string",
            Value::List(_) => "list",
            Value::Dict(_) => "dictionary",
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as a UTF-8 string, if it is a valid UTF-8 byte string.
    ///
    /// ```
    /// use rbencode::bencode::{decode, Value};
    ///
    /// assert_eq!(decode(b"4:spam").unwrap().as_str(), Some("spam"));
    /// assert_eq!(decode(b"2:\xff\xfe").unwrap().as_str(), None);
    /// assert_eq!(Value::Integer(1).as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Consumes the value and returns the list, if it is one.
    pub fn into_list(mut self) -> Option<Vec<Value>> {
        match &mut self {
            Value::List(l) => Some(mem::take(l)),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes the value and returns the dictionary, if it is one.
    pub fn into_dict(mut self) -> Option<BTreeMap<Bytes, Value>> {
        match &mut self {
            Value::Dict(d) => Some(mem::take(d)),
            _ => None,
        }
    }

    /// Looks up a key in this value if it is a dictionary.
    ///
    /// ```
    /// use rbencode::bencode::decode;
    ///
    /// let value = decode(b"d3:foo3:bare").unwrap();
    /// assert_eq!(value.get(b"foo").and_then(|v| v.as_str()), Some("bar"));
    /// assert_eq!(value.get(b"missing"), None);
    /// ```
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?.get(key)
    }
}

/// Children are moved onto a heap stack and dropped one level at a time.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending: Vec<Value> = match self {
            Value::List(items) if !items.is_empty() => mem::take(items),
            Value::Dict(entries) if !entries.is_empty() => {
                mem::take(entries).into_values().collect()
            }
            _ => return,
        };

        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::List(items) => pending.append(items),
                Value::Dict(entries) => pending.extend(mem::take(entries).into_values()),
                _ => {}
            }
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Bytes(Bytes::from(s))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(b))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<BTreeMap<Bytes, Value>> for Value {
    fn from(d: BTreeMap<Bytes, Value>) -> Self {
        Value::Dict(d)
    }
}

/// Renders the value as an indented, JSON-like tree.
///
/// Byte strings that are not valid UTF-8 are shown as `<N bytes: hex>`.
///
/// ```
/// use rbencode::bencode::decode;
///
/// let value = decode(b"d3:keyli1e2:\xff\xfeee").unwrap();
/// assert_eq!(
///     value.to_string(),
///     "{\n  \"key\": [\n    1,\n    <2 bytes: fffe>\n  ]\n}"
/// );
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Piece::Value(self, 0)];

        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Pad(indent) => write!(f, "{:width$}", "", width = indent * 2)?,
                Piece::Bytes(b) => write_bytes(f, b)?,
                Piece::Value(Value::Integer(i), _) => write!(f, "{}", i)?,
                Piece::Value(Value::Bytes(b), _) => write_bytes(f, b)?,
                Piece::Value(Value::List(l), _) if l.is_empty() => f.write_str("[]")?,
                Piece::Value(Value::Dict(d), _) if d.is_empty() => f.write_str("{}")?,
                Piece::Value(Value::List(l), indent) => {
                    f.write_str("[\n")?;
                    let mut seq = Vec::with_capacity(l.len() * 3 + 2);
                    for (i, item) in l.iter().enumerate() {
                        seq.push(Piece::Pad(indent + 1));
                        seq.push(Piece::Value(item, indent + 1));
                        seq.push(Piece::Text(separator(i, l.len())));
                    }
                    seq.push(Piece::Pad(indent));
                    seq.push(Piece::Text("]"));
                    stack.extend(seq.into_iter().rev());
                }
                Piece::Value(Value::Dict(d), indent) => {
                    f.write_str("{\n")?;
                    let mut seq = Vec::with_capacity(d.len() * 5 + 2);
                    for (i, (key, item)) in d.iter().enumerate() {
                        seq.push(Piece::Pad(indent + 1));
                        seq.push(Piece::Bytes(key));
                        seq.push(Piece::Text(": "));
                        seq.push(Piece::Value(item, indent + 1));
                        seq.push(Piece::Text(separator(i, d.len())));
                    }
                    seq.push(Piece::Pad(indent));
                    seq.push(Piece::Text("}"));
                    stack.extend(seq.into_iter().rev());
                }
            }
        }

        Ok(())
    }
}

/// One pending write of the `Display` impl.
enum Piece<'a> {
    Value(&'a Value, usize),
    Bytes(&'a [u8]),
    Pad(usize),
    Text(&'static str),
}

fn separator(index: usize, len: usize) -> &'static str {
    if index + 1 < len {
        ",\n"
    } else {
        "\n"
    }
}

fn write_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    match std::str::from_utf8(bytes) {
        Ok(s) => write!(f, "{:?}", s),
        Err(_) => {
            write!(f, "<{} bytes: ", bytes.len())?;
            for b in bytes {
                write!(f, "{:02x}", b)?;
            }
            f.write_str(">")
        }
    }
}
