//! Line-oriented text codec for the persisted store file.
//!
//! On-disk format:
//! ```text
//! <key>:<value>\n
//! <key>:<value>\n
//! ...
//! ```
//!
//! There is no header and no escaping. The first `:` on a line separates the
//! key from the value; the value may contain further `:` characters. Empty
//! lines are ignored and an empty file is an empty mapping.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::error::{StoreError, StoreResult};
use crate::key::{is_valid_key, SEPARATOR};

/// In-memory mapping from key to value.
pub type Entries = HashMap<String, String>;

/// Decode raw file bytes.
///
/// Bytes that are not valid UTF-8 are reported as a [`StoreError::Format`]
/// on the line holding the first offending byte.
pub fn decode_bytes(bytes: &[u8]) -> StoreResult<Entries> {
    match std::str::from_utf8(bytes) {
        Ok(text) => decode(text),
        Err(e) => {
            let valid = &bytes[..e.valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            Err(StoreError::Format {
                line,
                reason: "content is not valid UTF-8".to_string(),
            })
        }
    }
}

/// Decode persisted text into a mapping.
///
/// Any malformed line fails the whole decode. A key that appears on more
/// than one line keeps the value from the last of them; unlike
/// [`create`](crate::KvStore::create), duplicates are not an error here.
pub fn decode(text: &str) -> StoreResult<Entries> {
    let mut entries = Entries::new();
    for (idx, line) in text.split('\n').enumerate() {
        if line.is_empty() {
            continue;
        }
        let (key, value) = parse_line(line, idx + 1)?;
        entries.insert(key.to_string(), value.to_string());
    }
    Ok(entries)
}

fn parse_line(line: &str, number: usize) -> StoreResult<(&str, &str)> {
    let Some((key, value)) = line.split_once(SEPARATOR) else {
        return Err(StoreError::Format {
            line: number,
            reason: format!("missing '{SEPARATOR}' separator"),
        });
    };
    if !is_valid_key(key) {
        return Err(StoreError::Format {
            line: number,
            reason: format!("invalid key {key:?}"),
        });
    }
    Ok((key, value))
}

/// Encode a mapping into its persisted text form.
pub fn encode(entries: &Entries) -> String {
    let mut out = String::new();
    for (key, value) in sorted(entries) {
        out.push_str(key);
        out.push(SEPARATOR);
        out.push_str(value);
        out.push('\n');
    }
    out
}

/// Stream the persisted form of `entries` into `w`.
///
/// Lines are emitted in ascending key order so the same mapping always
/// produces the same bytes.
pub fn encode_to<W: Write>(entries: &Entries, w: &mut W) -> io::Result<()> {
    for (key, value) in sorted(entries) {
        w.write_all(key.as_bytes())?;
        write!(w, "{SEPARATOR}")?;
        w.write_all(value.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}

fn sorted(entries: &Entries) -> Vec<(&String, &String)> {
    let mut sorted: Vec<(&String, &String)> = entries.iter().collect();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entries(pairs: &[(&str, &str)]) -> Entries {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Decode
    // -----------------------------------------------------------------------

    #[test]
    fn decode_empty_text() {
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn decode_two_lines() {
        let decoded = decode("k1:v1\nk2:v2\n").unwrap();
        assert_eq!(decoded, entries(&[("k1", "v1"), ("k2", "v2")]));
    }

    #[test]
    fn decode_without_trailing_newline() {
        let decoded = decode("k1:v1\nk2:v2").unwrap();
        assert_eq!(decoded.get("k2").map(String::as_str), Some("v2"));
    }

    #[test]
    fn decode_splits_on_first_separator() {
        let decoded = decode("json:{\"hellothere\":\"data\"}\nurl:http://x:80\n").unwrap();
        assert_eq!(decoded["json"], "{\"hellothere\":\"data\"}");
        assert_eq!(decoded["url"], "http://x:80");
    }

    #[test]
    fn decode_empty_key_and_value() {
        let decoded = decode(":\nk:\n").unwrap();
        assert_eq!(decoded, entries(&[("", ""), ("k", "")]));
    }

    #[test]
    fn decode_skips_blank_lines() {
        let decoded = decode("\nk1:v1\n\n\nk2:v2\n\n").unwrap();
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn decode_last_write_wins() {
        // Duplicates on disk are tolerated; the later line replaces the earlier.
        let decoded = decode("k:first\nother:x\nk:second\n").unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded["k"], "second");
    }

    #[test]
    fn decode_rejects_bad_key() {
        let err = decode("bad$key:v\n").unwrap_err();
        assert!(matches!(err, StoreError::Format { line: 1, .. }));
    }

    #[test]
    fn decode_rejects_missing_separator_with_line_number() {
        let err = decode("a:1\nb:2\nnoseparator\nc:3\n").unwrap_err();
        match err {
            StoreError::Format { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("separator"));
            }
            other => panic!("expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn decode_bytes_rejects_invalid_utf8() {
        let err = decode_bytes(b"a:1\nb:\xff\xfe\n").unwrap_err();
        assert!(matches!(err, StoreError::Format { line: 2, .. }));
    }

    #[test]
    fn decode_bytes_accepts_utf8_values() {
        let decoded = decode_bytes("greeting:héllo wörld\n".as_bytes()).unwrap();
        assert_eq!(decoded["greeting"], "héllo wörld");
    }

    // -----------------------------------------------------------------------
    // Encode
    // -----------------------------------------------------------------------

    #[test]
    fn encode_empty_mapping() {
        assert_eq!(encode(&Entries::new()), "");
    }

    #[test]
    fn encode_is_sorted_by_key() {
        let text = encode(&entries(&[("b", "2"), ("a", "1"), ("c", "x:y")]));
        assert_eq!(text, "a:1\nb:2\nc:x:y\n");
    }

    #[test]
    fn encode_to_writer() {
        let mut out = Vec::new();
        encode_to(&entries(&[("key1", "value1")]), &mut out).unwrap();
        assert_eq!(out, b"key1:value1\n");
    }

    #[test]
    fn encode_matches_streamed_bytes() {
        let map = entries(&[("z", "last"), ("a", "x:y"), ("", "empty-key"), ("m", "")]);
        let mut streamed = Vec::new();
        encode_to(&map, &mut streamed).unwrap();
        let text = encode(&map);
        assert_eq!(text.as_bytes(), streamed.as_slice());
        assert_eq!(text, ":empty-key\na:x:y\nm:\nz:last\n");
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            map in prop::collection::hash_map("[A-Za-z0-9_-]{0,12}", "[^\n]{0,24}", 0..16)
        ) {
            let decoded = decode(&encode(&map)).unwrap();
            prop_assert_eq!(decoded, map);
        }
    }
}
