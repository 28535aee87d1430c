use super::error::BencodeError;
use super::value::Value;
use std::io::Write;

/// Encodes a bencode value to a byte vector.
///
/// Dictionary keys are written in sorted order, so any value produced by
/// [`decode`](super::decode) re-encodes to bytes that decode to an equal value.
///
/// # Errors
///
/// Returns an error if writing to the internal buffer fails.
///
/// # Examples
///
/// ```
/// use rbencode::bencode::{encode, Value};
/// use std::collections::BTreeMap;
/// use bytes::Bytes;
///
/// let list = Value::List(vec![Value::Integer(1), Value::string("two")]);
/// assert_eq!(encode(&list).unwrap(), b"li1e3:twoe");
///
/// let mut dict = BTreeMap::new();
/// dict.insert(Bytes::from_static(b"b"), Value::Integer(2));
/// dict.insert(Bytes::from_static(b"a"), Value::Integer(1));
/// assert_eq!(encode(&Value::Dict(dict)).unwrap(), b"d1:ai1e1:bi2ee");
/// ```
pub fn encode(value: &Value) -> Result<Vec<u8>, BencodeError> {
    let mut buf = Vec::new();
    encode_to(value, &mut buf)?;
    Ok(buf)
}

/// Encodes a bencode value into any [`Write`] sink.
///
/// Containers are walked with an explicit stack, so nesting depth is bounded
/// only by memory.
pub fn encode_to<W: Write>(value: &Value, writer: &mut W) -> Result<(), BencodeError> {
    let mut stack = vec![Token::Value(value)];

    while let Some(token) = stack.pop() {
        match token {
            Token::End => writer.write_all(b"e")?,
            Token::Key(key) => {
                write!(writer, "{}:", key.len())?;
                writer.write_all(key)?;
            }
            Token::Value(Value::Integer(i)) => {
                write!(writer, "i{}e", i)?;
            }
            Token::Value(Value::Bytes(b)) => {
                write!(writer, "{}:", b.len())?;
                writer.write_all(b)?;
            }
            Token::Value(Value::List(l)) => {
                writer.write_all(b"l")?;
                stack.push(Token::End);
                stack.extend(l.iter().rev().map(Token::Value));
            }
            Token::Value(Value::Dict(d)) => {
                writer.write_all(b"d")?;
                stack.push(Token::End);
                for (key, val) in d.iter().rev() {
                    stack.push(Token::Value(val));
                    stack.push(Token::Key(key));
                }
            }
        }
    }
    Ok(())
}

/// Pending output of [`encode_to`].
enum Token<'a> {
    Value(&'a Value),
    Key(&'a [u8]),
    End,
}
