use std::collections::BTreeMap;
use std::path::PathBuf;

use bytes::Bytes;
use sha1::{Digest, Sha1};

use super::*;
use crate::bencode::{decode, encode, BencodeError, Value};

fn single_file_manifest() -> Vec<u8> {
    let mut data = b"d8:announce15:http://test.com4:infod6:lengthi40000e4:name8:file.txt12:piece lengthi16384e6:pieces60:".to_vec();
    data.extend_from_slice(&[1u8; 20]);
    data.extend_from_slice(&[2u8; 20]);
    data.extend_from_slice(&[3u8; 20]);
    data.extend_from_slice(b"ee");
    data
}

fn multi_file_manifest() -> Vec<u8> {
    let mut data = b"d13:announce-listll15:http://test.com17:udp://backup:6969el15:http://test.comee".to_vec();
    data.extend_from_slice(b"7:comment5:hello13:creation datei1700000000e");
    data.extend_from_slice(b"4:infod5:filesl");
    data.extend_from_slice(b"d6:lengthi100e4:pathl1:a5:x.bineed6:lengthi50e4:pathl5:y.txtee");
    data.extend_from_slice(b"e4:name4:root12:piece lengthi64e6:pieces60:");
    data.extend_from_slice(&[9u8; 60]);
    data.extend_from_slice(b"7:privatei1eee");
    data
}

#[test]
fn test_single_file_manifest() {
    let manifest = Metainfo::from_bytes(&single_file_manifest()).unwrap();

    assert_eq!(manifest.announce.as_deref(), Some("http://test.com"));
    assert_eq!(manifest.info.name, "file.txt");
    assert_eq!(manifest.info.layout, FileLayout::Single);
    assert_eq!(manifest.info.piece_length, 16384);
    assert_eq!(manifest.info.total_length, 40000);
    assert_eq!(manifest.info.piece_count(), 3);
    assert_eq!(manifest.info.piece_hash(1), Some(&[2u8; 20]));
    assert_eq!(manifest.info.piece_hash(3), None);
    assert!(!manifest.info.private);

    assert_eq!(manifest.info.files.len(), 1);
    assert_eq!(manifest.info.files[0].path, vec!["file.txt".to_string()]);
    assert_eq!(manifest.info.files[0].length, 40000);
}

#[test]
fn test_piece_size() {
    let manifest = Metainfo::from_bytes(&single_file_manifest()).unwrap();
    assert_eq!(manifest.info.piece_size(0), Some(16384));
    assert_eq!(manifest.info.piece_size(1), Some(16384));
    assert_eq!(manifest.info.piece_size(2), Some(40000 - 2 * 16384));
    assert_eq!(manifest.info.piece_size(3), None);
}

#[test]
fn test_multi_file_manifest() {
    let manifest = Metainfo::from_bytes(&multi_file_manifest()).unwrap();

    assert_eq!(manifest.announce, None);
    assert_eq!(manifest.comment.as_deref(), Some("hello"));
    assert_eq!(manifest.creation_date, Some(1_700_000_000));
    assert_eq!(manifest.info.layout, FileLayout::Multi);
    assert!(manifest.info.private);

    let files = &manifest.info.files;
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].relative_path(), PathBuf::from("a").join("x.bin"));
    assert_eq!(files[0].offset, 0);
    assert_eq!(files[1].path, vec!["y.txt".to_string()]);
    assert_eq!(files[1].offset, 100);
    assert_eq!(manifest.info.total_length, 150);
}

#[test]
fn test_trackers_deduplicated() {
    let manifest = Metainfo::from_bytes(&multi_file_manifest()).unwrap();
    assert_eq!(
        manifest.trackers(),
        vec![
            "http://test.com".to_string(),
            "udp://backup:6969".to_string()
        ]
    );
}

#[test]
fn test_info_hash_matches_raw_info() {
    let data = single_file_manifest();
    let manifest = Metainfo::from_bytes(&data).unwrap();

    let start = data.windows(6).position(|w| w == b"4:info").unwrap() + 6;
    let raw = &data[start..data.len() - 1];
    assert_eq!(manifest.raw_info().as_ref(), raw);
    assert_eq!(manifest.info_hash, InfoHash::from_info_bytes(raw));
}

#[test]
fn test_info_hash_covers_source_bytes() {
    // Unsorted keys and a zero-padded integer: not the canonical encoding.
    let mut info = b"d4:name5:a.txt6:lengthi10e12:piece lengthi016384e6:pieces20:".to_vec();
    info.extend_from_slice(&[0u8; 20]);
    info.push(b'e');

    let mut data = b"d4:info".to_vec();
    data.extend_from_slice(&info);
    data.extend_from_slice(b"7:comment2:hie");

    let manifest = Metainfo::from_bytes(&data).unwrap();
    assert_eq!(manifest.raw_info().as_ref(), info.as_slice());
    assert_eq!(
        manifest.info_hash.as_bytes().as_slice(),
        Sha1::digest(&info).as_slice()
    );
    assert_eq!(manifest.info.piece_length, 16384);
    assert_eq!(manifest.comment.as_deref(), Some("hi"));

    let canonical = Metainfo::from_value(&decode(&data).unwrap()).unwrap();
    assert_ne!(canonical.raw_info().as_ref(), info.as_slice());
    assert_ne!(canonical.info_hash, manifest.info_hash);
    assert_eq!(canonical.info, manifest.info);
}

#[test]
fn test_info_hash_uses_last_duplicate_info() {
    let first = b"d4:name1:a6:lengthi1e12:piece lengthi1e6:pieces0:e";
    let second = b"d4:name1:b6:lengthi1e12:piece lengthi1e6:pieces0:e";
    let mut data = b"d4:info".to_vec();
    data.extend_from_slice(first);
    data.extend_from_slice(b"4:info");
    data.extend_from_slice(second);
    data.push(b'e');

    let manifest = Metainfo::from_bytes(&data).unwrap();
    assert_eq!(manifest.info.name, "b");
    assert_eq!(manifest.raw_info().as_ref(), second.as_slice());
    assert_eq!(manifest.info_hash, InfoHash::from_info_bytes(second));
}

#[test]
fn test_roundtrip_through_value() {
    for data in [single_file_manifest(), multi_file_manifest()] {
        let manifest = Metainfo::from_bytes(&data).unwrap();
        let encoded = manifest.to_bytes().unwrap();
        assert_eq!(decode(&encoded).unwrap(), decode(&data).unwrap());

        let again = Metainfo::from_bytes(&encoded).unwrap();
        assert_eq!(again.info, manifest.info);
        assert_eq!(again.info_hash, manifest.info_hash);
    }
}

#[test]
fn test_missing_fields() {
    assert!(matches!(
        Metainfo::from_bytes(b"de"),
        Err(MetainfoError::MissingField("info"))
    ));
    assert!(matches!(
        Metainfo::from_bytes(b"d4:infod4:name1:a12:piece lengthi1e6:pieces0:ee"),
        Err(MetainfoError::MissingField("length or files"))
    ));
    assert!(matches!(
        Metainfo::from_bytes(b"d4:infod6:lengthi1e12:piece lengthi1e6:pieces0:ee"),
        Err(MetainfoError::MissingField("name"))
    ));
}

#[test]
fn test_invalid_fields() {
    assert!(matches!(
        Metainfo::from_bytes(b"li1ee"),
        Err(MetainfoError::InvalidField("root"))
    ));
    assert!(matches!(
        Metainfo::from_bytes(b"d4:infod6:lengthi1e4:name1:a12:piece lengthi1e6:pieces3:abcee"),
        Err(MetainfoError::InvalidField("pieces"))
    ));
    assert!(matches!(
        Metainfo::from_bytes(b"d4:infod6:lengthi-1e4:name1:a12:piece lengthi1e6:pieces0:ee"),
        Err(MetainfoError::InvalidField("length"))
    ));
    assert!(matches!(
        Metainfo::from_bytes(b"d4:infod6:lengthi1e4:name1:a12:piece lengthi0e6:pieces0:ee"),
        Err(MetainfoError::InvalidField("piece length"))
    ));
    assert!(matches!(
        Metainfo::from_bytes(b"d4:infod5:filesld6:lengthi1e4:pathleee4:name1:a12:piece lengthi1e6:pieces0:ee"),
        Err(MetainfoError::InvalidField("path"))
    ));
}

#[test]
fn test_bencode_errors_propagate() {
    assert!(matches!(
        Metainfo::from_bytes(b"d4:info"),
        Err(MetainfoError::Bencode(BencodeError::UnexpectedEnd(_)))
    ));
}

#[test]
fn test_from_value() {
    let mut info = BTreeMap::new();
    info.insert(Bytes::from_static(b"name"), Value::string("n"));
    info.insert(Bytes::from_static(b"length"), Value::Integer(5));
    info.insert(Bytes::from_static(b"piece length"), Value::Integer(8));
    info.insert(Bytes::from_static(b"pieces"), Value::from(vec![7u8; 20]));

    let mut root = BTreeMap::new();
    root.insert(Bytes::from_static(b"info"), Value::Dict(info.clone()));

    let manifest = Metainfo::from_value(&Value::Dict(root)).unwrap();
    assert_eq!(manifest.info.total_length, 5);
    assert_eq!(
        manifest.raw_info().as_ref(),
        encode(&Value::Dict(info)).unwrap().as_slice()
    );
}

#[test]
fn test_info_hash_hex() {
    let hex = "0123456789abcdef0123456789abcdef01234567";
    let hash = InfoHash::from_hex(hex).unwrap();
    assert_eq!(hash.to_hex(), hex);
    assert_eq!(hash.to_string(), hex);
    assert!(InfoHash::from_hex("0123").is_err());
    assert!(InfoHash::from_hex("zz23456789abcdef0123456789abcdef01234567").is_err());
    assert!(InfoHash::from_hex("+f23456789abcdef0123456789abcdef01234567").is_err());
    assert!(InfoHash::from_hex("-f23456789abcdef0123456789abcdef01234567").is_err());
}
