use super::error::MetainfoError;
use super::info_hash::InfoHash;
use crate::bencode::{decode_prefix, encode, BencodeError, Decoder, Value};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::PathBuf;

/// Length of one SHA-1 piece hash in the `pieces` field.
pub const PIECE_HASH_LEN: usize = 20;

/// Whether the manifest describes one file or a directory of files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileLayout {
    /// The `info` dictionary has a `length` field; `name` is the file name.
    Single,
    /// The `info` dictionary has a `files` list; `name` is the directory name.
    Multi,
}

/// A parsed download manifest.
///
/// # Examples
///
/// ```
/// use rbencode::metainfo::{FileLayout, Metainfo};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut data = b"d8:announce22:http://tracker.test/an4:infod6:lengthi10e4:name5:a.txt".to_vec();
/// data.extend_from_slice(b"12:piece lengthi16384e6:pieces20:");
/// data.extend_from_slice(&[0u8; 20]);
/// data.extend_from_slice(b"ee");
///
/// let manifest = Metainfo::from_bytes(&data)?;
/// assert_eq!(manifest.announce.as_deref(), Some("http://tracker.test/an"));
/// assert_eq!(manifest.info.layout, FileLayout::Single);
/// assert_eq!(manifest.info.total_length, 10);
/// assert_eq!(manifest.info.piece_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Metainfo {
    /// The `info` dictionary.
    pub info: Info,
    /// SHA-1 of the bencoded `info` dictionary.
    pub info_hash: InfoHash,
    /// Primary tracker URL.
    pub announce: Option<String>,
    /// Tiered tracker list ([BEP-12](http://bittorrent.org/beps/bep_0012.html)).
    pub announce_list: Vec<Vec<String>>,
    /// Unix timestamp of creation.
    pub creation_date: Option<i64>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    raw_info: Bytes,
}

/// The `info` dictionary of a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    /// File name (single file) or directory name (multiple files).
    pub name: String,
    /// Number of bytes per piece.
    pub piece_length: u64,
    /// SHA-1 hash of each piece.
    pub pieces: Vec<[u8; PIECE_HASH_LEN]>,
    /// Files in piece order. A single-file manifest has exactly one entry.
    pub files: Vec<File>,
    pub layout: FileLayout,
    /// Sum of all file lengths.
    pub total_length: u64,
    pub private: bool,
}

/// A file within a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Path components. For a single-file manifest this is just the name;
    /// for a multi-file manifest it is relative to the [`Info::name`]
    /// directory, the last component being the file name.
    pub path: Vec<String>,
    /// Size in bytes.
    pub length: u64,
    /// Offset of the file's first byte in the concatenated piece data.
    pub offset: u64,
}

impl File {
    pub fn relative_path(&self) -> PathBuf {
        self.path.iter().collect()
    }
}

impl Metainfo {
    /// Decodes and maps a manifest.
    ///
    /// The info hash is taken over the exact source bytes of the `info`
    /// dictionary, whatever their key order or integer formatting. Bytes after
    /// the top-level dictionary are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid bencode or if a required
    /// field is missing or malformed.
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let (value, consumed) = decode_prefix(data)?;
        if consumed < data.len() {
            tracing::debug!(
                "ignoring {} trailing bytes after manifest",
                data.len() - consumed
            );
        }

        let dict = value.as_dict().ok_or(MetainfoError::InvalidField("root"))?;
        let span = info_span(data)?.ok_or(MetainfoError::MissingField("info"))?;
        Self::from_dict(dict, Bytes::copy_from_slice(&data[span]))
    }

    /// Maps an already decoded top-level dictionary.
    ///
    /// The source bytes are no longer available here, so `raw_info` and the
    /// info hash come from the canonical encoding of `info`. They match
    /// [`Metainfo::from_bytes`] only for canonically encoded manifests.
    pub fn from_value(value: &Value) -> Result<Self, MetainfoError> {
        let dict = value.as_dict().ok_or(MetainfoError::InvalidField("root"))?;
        let raw_info = Bytes::from(encode(require(dict, "info")?)?);
        Self::from_dict(dict, raw_info)
    }

    fn from_dict(dict: &BTreeMap<Bytes, Value>, raw_info: Bytes) -> Result<Self, MetainfoError> {
        let info = parse_info(require(dict, "info")?)?;
        let info_hash = InfoHash::from_info_bytes(&raw_info);

        let announce = optional_str(dict, "announce")?;

        let announce_list = match dict.get(b"announce-list".as_slice()) {
            Some(tiers) => tiers
                .as_list()
                .ok_or(MetainfoError::InvalidField("announce-list"))?
                .iter()
                .map(|tier| -> Result<Vec<String>, MetainfoError> {
                    tier.as_list()
                        .ok_or(MetainfoError::InvalidField("announce-list"))?
                        .iter()
                        .map(|url| {
                            url.as_str()
                                .map(String::from)
                                .ok_or(MetainfoError::InvalidField("announce-list"))
                        })
                        .collect()
                })
                .collect::<Result<Vec<Vec<String>>, _>>()?,
            None => Vec::new(),
        };

        let creation_date = match dict.get(b"creation date".as_slice()) {
            Some(v) => Some(
                v.as_integer()
                    .ok_or(MetainfoError::InvalidField("creation date"))?,
            ),
            None => None,
        };

        let comment = optional_str(dict, "comment")?;
        let created_by = optional_str(dict, "created by")?;

        tracing::debug!(
            "mapped manifest {} ({} files, {} pieces)",
            info_hash,
            info.files.len(),
            info.pieces.len()
        );

        Ok(Self {
            info,
            info_hash,
            announce,
            announce_list,
            creation_date,
            comment,
            created_by,
            raw_info,
        })
    }

    /// Projects the manifest back into a bencode dictionary.
    pub fn to_value(&self) -> Result<Value, MetainfoError> {
        let mut root = BTreeMap::new();

        if let Some(ref announce) = self.announce {
            root.insert(
                Bytes::from_static(b"announce"),
                Value::from(announce.clone()),
            );
        }

        if !self.announce_list.is_empty() {
            let tiers = self
                .announce_list
                .iter()
                .map(|tier| Value::List(tier.iter().map(|u| Value::from(u.clone())).collect()))
                .collect::<Vec<_>>();
            root.insert(Bytes::from_static(b"announce-list"), Value::List(tiers));
        }

        if let Some(ref comment) = self.comment {
            root.insert(Bytes::from_static(b"comment"), Value::from(comment.clone()));
        }

        if let Some(ref created_by) = self.created_by {
            root.insert(
                Bytes::from_static(b"created by"),
                Value::from(created_by.clone()),
            );
        }

        if let Some(date) = self.creation_date {
            root.insert(Bytes::from_static(b"creation date"), Value::Integer(date));
        }

        root.insert(Bytes::from_static(b"info"), self.info.to_value()?);

        Ok(Value::Dict(root))
    }

    /// Encodes the manifest as bencode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MetainfoError> {
        Ok(encode(&self.to_value()?)?)
    }

    /// Returns the bencoded `info` dictionary the info hash was computed over.
    pub fn raw_info(&self) -> &Bytes {
        &self.raw_info
    }

    /// Returns all tracker URLs from both `announce` and `announce-list`.
    ///
    /// The primary tracker comes first. Duplicates are removed.
    pub fn trackers(&self) -> Vec<String> {
        let mut trackers = Vec::new();

        if let Some(ref announce) = self.announce {
            trackers.push(announce.clone());
        }

        for tier in &self.announce_list {
            for tracker in tier {
                if !trackers.contains(tracker) {
                    trackers.push(tracker.clone());
                }
            }
        }

        trackers
    }
}

impl Info {
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn piece_hash(&self, index: usize) -> Option<&[u8; PIECE_HASH_LEN]> {
        self.pieces.get(index)
    }

    /// Size of the piece at `index`. Every piece is `piece_length` bytes
    /// except the last, which holds whatever remains.
    pub fn piece_size(&self, index: usize) -> Option<u64> {
        if index >= self.pieces.len() {
            return None;
        }
        let start = self.piece_length.checked_mul(index as u64)?;
        let remaining = self.total_length.checked_sub(start)?;
        Some(remaining.min(self.piece_length))
    }

    fn to_value(&self) -> Result<Value, MetainfoError> {
        let mut info = BTreeMap::new();

        info.insert(Bytes::from_static(b"name"), Value::from(self.name.clone()));
        info.insert(
            Bytes::from_static(b"piece length"),
            Value::Integer(to_integer(self.piece_length, "piece length")?),
        );
        info.insert(
            Bytes::from_static(b"pieces"),
            Value::from(self.pieces.concat()),
        );

        if self.private {
            info.insert(Bytes::from_static(b"private"), Value::Integer(1));
        }

        match self.layout {
            FileLayout::Single => {
                info.insert(
                    Bytes::from_static(b"length"),
                    Value::Integer(to_integer(self.total_length, "length")?),
                );
            }
            FileLayout::Multi => {
                let files = self
                    .files
                    .iter()
                    .map(|file| -> Result<Value, MetainfoError> {
                        let mut entry = BTreeMap::new();
                        entry.insert(
                            Bytes::from_static(b"length"),
                            Value::Integer(to_integer(file.length, "length")?),
                        );
                        entry.insert(
                            Bytes::from_static(b"path"),
                            Value::List(file.path.iter().map(|p| Value::from(p.clone())).collect()),
                        );
                        Ok(Value::Dict(entry))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                info.insert(Bytes::from_static(b"files"), Value::List(files));
            }
        }

        Ok(Value::Dict(info))
    }
}

/// Byte range of the top-level `info` value in `data`. A repeated key
/// resolves to its last occurrence, as in the decoded dictionary.
fn info_span(data: &[u8]) -> Result<Option<Range<usize>>, BencodeError> {
    let mut decoder = Decoder::new(data);
    decoder.begin_dict()?;

    let mut span = None;
    while let Some(key) = decoder.next_key()? {
        let start = decoder.position();
        decoder.decode_value()?;
        if key.as_ref() == b"info" {
            span = Some(start..decoder.position());
        }
    }
    Ok(span)
}

fn parse_info(value: &Value) -> Result<Info, MetainfoError> {
    let dict = value.as_dict().ok_or(MetainfoError::InvalidField("info"))?;

    let name = require_str(dict, "name")?.to_string();

    let piece_length = require_u64(dict, "piece length")?;
    if piece_length == 0 {
        return Err(MetainfoError::InvalidField("piece length"));
    }

    let pieces_bytes = require(dict, "pieces")?
        .as_bytes()
        .ok_or(MetainfoError::InvalidField("pieces"))?;

    if pieces_bytes.len() % PIECE_HASH_LEN != 0 {
        return Err(MetainfoError::InvalidField("pieces"));
    }

    let pieces: Vec<[u8; PIECE_HASH_LEN]> = pieces_bytes
        .chunks_exact(PIECE_HASH_LEN)
        .map(|chunk| {
            let mut arr = [0u8; PIECE_HASH_LEN];
            arr.copy_from_slice(chunk);
            arr
        })
        .collect();

    let private = dict
        .get(b"private".as_slice())
        .and_then(|v| v.as_integer())
        .map(|v| v == 1)
        .unwrap_or(false);

    let (layout, files, total_length) = if dict.contains_key(b"length".as_slice()) {
        let length = require_u64(dict, "length")?;
        let file = File {
            path: vec![name.clone()],
            length,
            offset: 0,
        };
        (FileLayout::Single, vec![file], length)
    } else if let Some(files_value) = dict.get(b"files".as_slice()) {
        let files_list = files_value
            .as_list()
            .ok_or(MetainfoError::InvalidField("files"))?;

        let mut files = Vec::with_capacity(files_list.len());
        let mut offset = 0u64;

        for file_value in files_list {
            let file_dict = file_value
                .as_dict()
                .ok_or(MetainfoError::InvalidField("files"))?;

            let length = require_u64(file_dict, "length")?;

            let path = require(file_dict, "path")?
                .as_list()
                .ok_or(MetainfoError::InvalidField("path"))?
                .iter()
                .map(|p| p.as_str().map(String::from))
                .collect::<Option<Vec<String>>>()
                .filter(|p| !p.is_empty())
                .ok_or(MetainfoError::InvalidField("path"))?;

            files.push(File {
                path,
                length,
                offset,
            });

            offset = offset
                .checked_add(length)
                .ok_or(MetainfoError::InvalidField("length"))?;
        }

        (FileLayout::Multi, files, offset)
    } else {
        return Err(MetainfoError::MissingField("length or files"));
    };

    Ok(Info {
        name,
        piece_length,
        pieces,
        files,
        layout,
        total_length,
        private,
    })
}

fn require<'a>(
    dict: &'a BTreeMap<Bytes, Value>,
    key: &'static str,
) -> Result<&'a Value, MetainfoError> {
    dict.get(key.as_bytes())
        .ok_or(MetainfoError::MissingField(key))
}

fn require_str<'a>(
    dict: &'a BTreeMap<Bytes, Value>,
    key: &'static str,
) -> Result<&'a str, MetainfoError> {
    require(dict, key)?
        .as_str()
        .ok_or(MetainfoError::InvalidField(key))
}

fn require_u64(dict: &BTreeMap<Bytes, Value>, key: &'static str) -> Result<u64, MetainfoError> {
    require(dict, key)?
        .as_integer()
        .and_then(|i| u64::try_from(i).ok())
        .ok_or(MetainfoError::InvalidField(key))
}

fn optional_str(
    dict: &BTreeMap<Bytes, Value>,
    key: &'static str,
) -> Result<Option<String>, MetainfoError> {
    dict.get(key.as_bytes())
        .map(|v| v.as_str().map(String::from).ok_or(MetainfoError::InvalidField(key)))
        .transpose()
}

fn to_integer(n: u64, field: &'static str) -> Result<i64, MetainfoError> {
    i64::try_from(n).map_err(|_| MetainfoError::InvalidField(field))
}
