//!
//! _Localization format codec_
//!
//! Parses and re-emits the game's localization text format:
//!
//! ```text
//! l_english:
//!  some_key: "A plain string"
//!  other_key:0 "A string carrying a numeric index"
//! ```
//!
//! The numeric index between the key and the quoted text is undocumented
//! by the format; it is carried through as opaque data and written back
//! verbatim for the same key. Quoted text may span physical lines;
//! embedded line breaks are normalized to single spaces.
//!

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::Error;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A value held under a localization key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleValue {
    /// A translatable string
    Text(String),
    /// A nested mapping; never produced by the parser but carried
    /// through batching and serialization untouched
    Nested(IndexMap<String, LocaleEntry>),
}

/// One localization entry: an optional numeric index plus a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleEntry {
    /// Opaque index tag from the source, eg the `0` in `key:0 "text"`
    pub index: Option<u32>,
    /// The entry's value
    pub value: LocaleValue,
}

impl LocaleEntry {
    /// A plain text entry without an index.
    pub fn text<S: Into<String>>(text: S) -> Self {
        LocaleEntry {
            index: None,
            value: LocaleValue::Text(text.into()),
        }
    }

    /// A text entry carrying an index tag.
    pub fn indexed<S: Into<String>>(index: u32, text: S) -> Self {
        LocaleEntry {
            index: Some(index),
            value: LocaleValue::Text(text.into()),
        }
    }
}

/// A parsed localization file: one root language key over ordered entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFile {
    /// The root key naming the file's language, eg `l_english`
    pub language: String,
    /// Entries in source order, keyed uniquely within the file
    pub entries: IndexMap<String, LocaleEntry>,
    /// Whether the source bytes started with a UTF-8 byte order mark
    pub bom: bool,
}

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"(?s)(\w+)\s*:\s*(\d+)?\s*"([^"]*)""#).unwrap())
}

/// Parses raw file bytes into a [`LocaleFile`].
///
/// The bytes are decoded as UTF-8 with BOM removal; BOM presence is
/// recorded so [`serialize`] can write it back. The first `:` separates
/// the root language key from the entry body.
pub fn parse(raw: &[u8]) -> Result<LocaleFile, Error> {
    let bom = raw.starts_with(&UTF8_BOM);
    let (content, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(raw);
    if had_errors {
        return Err(Error::Format("file is not valid UTF-8".to_string()));
    }

    let (header, body) = content
        .split_once(':')
        .ok_or_else(|| Error::Format("missing `<language>:` header line".to_string()))?;

    let language = header.trim();
    if language.is_empty() || !language.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(Error::Format(format!("invalid language key `{language}`")));
    }

    let mut entries = IndexMap::new();
    for caps in entry_pattern().captures_iter(body) {
        let key = caps[1].to_string();
        let index = caps.get(2).map(|m| {
            m.as_str()
                .parse::<u32>()
                .map_err(|_| Error::Format(format!("index out of range for key `{key}`")))
        });
        let index = match index {
            Some(res) => Some(res?),
            None => None,
        };
        let text = caps[3].replace(['\n', '\r'], " ").trim().to_string();

        entries.insert(
            key,
            LocaleEntry {
                index,
                value: LocaleValue::Text(text),
            },
        );
    }

    if entries.is_empty() && !body.trim().is_empty() {
        return Err(Error::Format(
            "no entries matched the `key:index \"text\"` grammar".to_string(),
        ));
    }

    Ok(LocaleFile {
        language: language.to_string(),
        entries,
        bom,
    })
}

/// Serializes a [`LocaleFile`] back to the on-disk format.
///
/// Emits the header line, then one line per entry in order:
/// ` key: "text"`, or ` key:index "text"` when the entry carries an
/// index. The UTF-8 BOM is prepended when the source had one.
pub fn serialize(file: &LocaleFile) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&file.language);
    out.push_str(":\n");
    write_entries(&mut out, &file.entries, 1);

    let mut bytes = Vec::with_capacity(out.len() + 3);
    if file.bom {
        bytes.extend_from_slice(&UTF8_BOM);
    }
    bytes.extend_from_slice(out.as_bytes());
    bytes
}

fn write_entries(out: &mut String, entries: &IndexMap<String, LocaleEntry>, depth: usize) {
    for (key, entry) in entries {
        for _ in 0..depth {
            out.push(' ');
        }
        out.push_str(key);
        out.push(':');
        match &entry.value {
            LocaleValue::Text(text) => {
                if let Some(index) = entry.index {
                    out.push_str(&index.to_string());
                }
                out.push_str(&format!(" \"{text}\"\n"));
            }
            LocaleValue::Nested(nested) => {
                out.push('\n');
                write_entries(out, nested, depth + 1);
            }
        }
    }
}

#[test]
fn parses_header_and_entries() {
    let src = b"l_english:\n KEY1: \"Hello\"\n KEY2:0 \"World\"\n";
    let file = parse(src).unwrap();

    assert_eq!(file.language, "l_english");
    assert!(!file.bom);
    assert_eq!(file.entries.len(), 2);
    assert_eq!(file.entries["KEY1"], LocaleEntry::text("Hello"));
    assert_eq!(file.entries["KEY2"], LocaleEntry::indexed(0, "World"));
}

#[test]
fn tolerates_whitespace_between_tokens() {
    let src = b"l_english:\n KEY1:   12   \"spaced\"\n KEY2 :\"tight\"\n";
    let file = parse(src).unwrap();

    assert_eq!(file.entries["KEY1"], LocaleEntry::indexed(12, "spaced"));
    assert_eq!(file.entries["KEY2"], LocaleEntry::text("tight"));
}

#[test]
fn normalizes_embedded_line_breaks() {
    let src = b"l_english:\n KEY: \"first\r\nsecond\nthird\"\n";
    let file = parse(src).unwrap();

    assert_eq!(file.entries["KEY"], LocaleEntry::text("first second third"));
}

#[test]
fn records_and_rewrites_bom() {
    let src = b"\xEF\xBB\xBFl_english:\n KEY: \"Hello\"\n";
    let file = parse(src).unwrap();
    assert!(file.bom);

    let bytes = serialize(&file);
    assert!(bytes.starts_with(&UTF8_BOM));
    assert_eq!(parse(&bytes).unwrap(), file);
}

#[test]
fn serializes_index_only_when_present() {
    let src = b"l_english:\n KEY1: \"Hello\"\n KEY2:0 \"World\"\n";
    let file = parse(src).unwrap();
    let out = String::from_utf8(serialize(&file)).unwrap();

    assert_eq!(out, "l_english:\n KEY1: \"Hello\"\n KEY2:0 \"World\"\n");
}

#[test]
fn round_trips_parsed_files() {
    let src = b"\xEF\xBB\xBFl_french:\n a:5 \"un $NUM$ deux\"\n b: \"[GetName] trois\"\n c:0 \"\"\n";
    let once = parse(src).unwrap();
    let again = parse(&serialize(&once)).unwrap();

    assert_eq!(once, again);
}

#[test]
fn rejects_missing_header() {
    assert!(matches!(parse(b"no header here"), Err(Error::Format(_))));
    assert!(matches!(parse(b"l english:\n k: \"v\"\n"), Err(Error::Format(_))));
}

#[test]
fn rejects_body_with_no_matching_entries() {
    let err = parse(b"l_english:\n just some prose\n").unwrap_err();
    assert!(matches!(err, Error::Format(_)));
}

#[test]
fn accepts_header_only_files() {
    let file = parse(b"l_english:\n").unwrap();
    assert!(file.entries.is_empty());
}
