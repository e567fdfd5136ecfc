//! Whole-pipeline scenarios over a temporary mod directory, with stub
//! gateways standing in for the remote model.

use std::fs;

use indexmap::IndexMap;

use v3_mod_translator::api::TranslateBatch;
use v3_mod_translator::{Error, Language, ModTranslator};

/// Returns canned translations looked up by key; keys it does not know
/// pass through untouched.
struct StubGateway {
    translations: IndexMap<String, String>,
}

impl StubGateway {
    fn new(pairs: &[(&str, &str)]) -> Self {
        StubGateway {
            translations: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl TranslateBatch for StubGateway {
    fn translate(
        &self,
        batch: &IndexMap<String, String>,
        _language: Language,
    ) -> Result<IndexMap<String, String>, Error> {
        Ok(batch
            .iter()
            .map(|(k, v)| {
                let translated = self.translations.get(k).unwrap_or(v);
                (k.clone(), translated.clone())
            })
            .collect())
    }
}

/// Echoes every batch back unchanged.
struct IdentityGateway;

impl TranslateBatch for IdentityGateway {
    fn translate(
        &self,
        batch: &IndexMap<String, String>,
        _language: Language,
    ) -> Result<IndexMap<String, String>, Error> {
        Ok(batch.clone())
    }
}

/// Drops a key from every response, violating the key-set contract.
struct KeyDroppingGateway;

impl TranslateBatch for KeyDroppingGateway {
    fn translate(
        &self,
        batch: &IndexMap<String, String>,
        _language: Language,
    ) -> Result<IndexMap<String, String>, Error> {
        let mut response = batch.clone();
        response.shift_remove_index(0);
        Ok(response)
    }
}

#[test]
fn translates_a_file_and_preserves_indexes() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    fs::write(
        src.path().join("test_l_english.yml"),
        "l_english:\n KEY1: \"Hello\"\n KEY2:0 \"World\"\n",
    )
    .unwrap();

    let gateway = StubGateway::new(&[("KEY1", "Bonjour"), ("KEY2", "Monde")]);
    let translator = ModTranslator::with_gateway(gateway, 2500);
    translator
        .translate_mod_files(src.path(), dst.path(), Language::French)
        .unwrap();

    let out = dst.path().join("localization/french/test_l_french.yml");
    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written, "l_french:\n KEY1: \"Bonjour\"\n KEY2:0 \"Monde\"\n");
}

#[test]
fn preserves_the_byte_order_mark() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let mut content = Vec::new();
    content.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
    content.extend_from_slice(b"l_english:\n KEY: \"Hello\"\n");
    fs::write(src.path().join("bom_l_english.yml"), &content).unwrap();

    let translator = ModTranslator::with_gateway(IdentityGateway, 2500);
    translator
        .translate_mod_files(src.path(), dst.path(), Language::German)
        .unwrap();

    let out = dst.path().join("localization/german/bom_l_german.yml");
    let written = fs::read(&out).unwrap();
    assert!(written.starts_with(&[0xEF, 0xBB, 0xBF]));
}

#[test]
fn identity_translation_round_trips() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let original = "l_english:\n greeting: \"Hello $NAME$\"\n farewell:3 \"Goodbye [GetName]\"\n";
    fs::write(src.path().join("rt_l_english.yml"), original).unwrap();

    let translator = ModTranslator::with_gateway(IdentityGateway, 2500);
    translator
        .translate_mod_files(src.path(), dst.path(), Language::English)
        .unwrap();

    let out = dst.path().join("localization/english/rt_l_english.yml");
    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written, original);
}

#[test]
fn skips_files_that_are_not_english_sources() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    fs::write(src.path().join("readme.md"), "not a localization file").unwrap();
    fs::write(
        src.path().join("done_l_french.yml"),
        "l_french:\n KEY: \"Bonjour\"\n",
    )
    .unwrap();

    let translator = ModTranslator::with_gateway(IdentityGateway, 2500);
    translator
        .translate_mod_files(src.path(), dst.path(), Language::French)
        .unwrap();

    let out_dir = dst.path().join("localization/french");
    let written: Vec<_> = fs::read_dir(&out_dir).unwrap().collect();
    assert!(written.is_empty());
}

#[test]
fn mismatched_key_sets_fail_the_file() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    fs::write(
        src.path().join("bad_l_english.yml"),
        "l_english:\n KEY1: \"Hello\"\n KEY2: \"World\"\n",
    )
    .unwrap();

    let translator = ModTranslator::with_gateway(KeyDroppingGateway, 2500);
    let err = translator
        .translate_mod_files(src.path(), dst.path(), Language::French)
        .unwrap_err();

    assert!(matches!(err, Error::FailedFiles(1)));
    // no partial output file may exist for the failed source
    assert!(!dst.path().join("localization/french/bad_l_french.yml").exists());
}

#[test]
fn a_failing_file_does_not_stop_the_walk() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    // sorts before the valid file, so the failure happens first
    fs::write(
        src.path().join("a_l_english.yml"),
        "l_english:\n not a grammar match\n",
    )
    .unwrap();
    fs::write(
        src.path().join("b_l_english.yml"),
        "l_english:\n KEY: \"Hello\"\n",
    )
    .unwrap();

    let translator = ModTranslator::with_gateway(IdentityGateway, 2500);
    let err = translator
        .translate_mod_files(src.path(), dst.path(), Language::Japanese)
        .unwrap_err();

    assert!(matches!(err, Error::FailedFiles(1)));
    assert!(dst.path().join("localization/japanese/b_l_japanese.yml").exists());
}

#[test]
fn splits_large_files_across_batches() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();

    let mut content = String::from("l_english:\n");
    for i in 0..40 {
        content.push_str(&format!(" key_{i}: \"value number {i}\"\n"));
    }
    fs::write(src.path().join("many_l_english.yml"), &content).unwrap();

    // threshold far below the total size forces several batches
    let translator = ModTranslator::with_gateway(IdentityGateway, 60);
    translator
        .translate_mod_files(src.path(), dst.path(), Language::English)
        .unwrap();

    let out = dst.path().join("localization/english/many_l_english.yml");
    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written, content);
}
