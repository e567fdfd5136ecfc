//!
//! _Request batcher_
//!
//! Packs localization entries into size-bounded groups so many short
//! strings travel in one translation request. Only text values are
//! batched; nested values pass through to the output untouched and do
//! not count towards batch size.
//!

use indexmap::IndexMap;

use crate::codec::{LocaleEntry, LocaleValue};

/// Default aggregate character size at which a batch is flushed.
pub const DEFAULT_THRESHOLD: usize = 2500;

/// Partitions `entries` into batches of at most roughly `threshold`
/// aggregate size.
///
/// Entries are taken in order and never split. The size of a batch is
/// the sum of `chars(key) + chars(text)` over its members. A batch is
/// flushed right after the entry that makes its size reach or exceed
/// `threshold`, so a single oversized entry still forms a complete
/// one-entry batch. The trailing partial batch is always kept.
pub fn make_batches(
    entries: &IndexMap<String, LocaleEntry>,
    threshold: usize,
) -> Vec<IndexMap<String, String>> {
    let mut batches = Vec::new();
    let mut buffer: IndexMap<String, String> = IndexMap::new();
    let mut size = 0usize;

    for (key, entry) in entries {
        let LocaleValue::Text(text) = &entry.value else {
            continue;
        };

        size += key.chars().count() + text.chars().count();
        buffer.insert(key.clone(), text.clone());

        if size >= threshold {
            batches.push(std::mem::take(&mut buffer));
            size = 0;
        }
    }

    if !buffer.is_empty() {
        batches.push(buffer);
    }

    batches
}

#[cfg(test)]
fn entry_map(pairs: &[(&str, &str)]) -> IndexMap<String, LocaleEntry> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), LocaleEntry::text(*v)))
        .collect()
}

#[test]
fn flushes_after_the_crossing_entry() {
    // each entry sizes at 8 (3 + 5); threshold 20 crosses on the third
    let entries = entry_map(&[
        ("aa1", "aaaaa"),
        ("bb2", "bbbbb"),
        ("cc3", "ccccc"),
        ("dd4", "ddddd"),
    ]);

    let batches = make_batches(&entries, 20);

    assert_eq!(batches.len(), 2);
    assert_eq!(
        batches[0].keys().collect::<Vec<_>>(),
        vec!["aa1", "bb2", "cc3"]
    );
    assert_eq!(batches[1].keys().collect::<Vec<_>>(), vec!["dd4"]);
}

#[test]
fn batch_only_crosses_threshold_on_its_final_entry() {
    let entries = entry_map(&[
        ("k1", "aaaa"),
        ("k2", "bbbbbbbbbb"),
        ("k3", "cc"),
        ("k4", "dddddddd"),
        ("k5", "e"),
    ]);
    let threshold = 15;

    let size = |m: &IndexMap<String, String>| -> usize {
        m.iter()
            .map(|(k, v)| k.chars().count() + v.chars().count())
            .sum()
    };

    for batch in make_batches(&entries, threshold) {
        let (last_key, last_value) = batch.last().unwrap();
        let without_last =
            size(&batch) - last_key.chars().count() - last_value.chars().count();
        assert!(without_last < threshold);
    }
}

#[test]
fn oversized_entry_forms_a_singleton_batch() {
    let entries = entry_map(&[
        ("big", "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"),
        ("tiny", "y"),
    ]);

    let batches = make_batches(&entries, 10);

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 1);
    assert!(batches[0].contains_key("big"));
    assert_eq!(batches[1].keys().collect::<Vec<_>>(), vec!["tiny"]);
}

#[test]
fn keeps_the_trailing_partial_batch() {
    let entries = entry_map(&[("a", "1"), ("b", "2")]);
    let batches = make_batches(&entries, 1000);

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
}

#[test]
fn covers_every_text_key_exactly_once() {
    let entries = entry_map(&[
        ("one", "first"),
        ("two", "second"),
        ("three", "third"),
        ("four", "fourth"),
        ("five", "fifth"),
    ]);

    let batches = make_batches(&entries, 12);

    let mut seen = Vec::new();
    for batch in &batches {
        seen.extend(batch.keys().cloned());
    }
    seen.sort();

    let mut expected: Vec<String> = entries.keys().cloned().collect();
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn skips_nested_values() {
    let mut entries = entry_map(&[("plain", "text")]);
    entries.insert(
        "group".to_string(),
        LocaleEntry {
            index: None,
            value: LocaleValue::Nested(entry_map(&[("inner", "value")])),
        },
    );

    let batches = make_batches(&entries, 100);

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].keys().collect::<Vec<_>>(), vec!["plain"]);
}

#[test]
fn empty_input_yields_no_batches() {
    assert!(make_batches(&IndexMap::new(), 100).is_empty());
}
