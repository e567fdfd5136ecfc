use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::utils::languages::Language;

pub mod languages;

/// Whether a file name marks a translatable source localization file.
pub fn is_mod_file(file_name: &str) -> bool {
    file_name.ends_with("_l_english.yaml") || file_name.ends_with("_l_english.yml")
}

/// Output file name for a source file: `english` replaced by the
/// target language code, eg `gui_l_english.yml` -> `gui_l_french.yml`.
pub fn destination_file_name(source_name: &str, language: Language) -> String {
    source_name.replace("english", language.code())
}

/// Creates `<dst>/localization/<language_code>/` and returns it.
pub fn create_output_directory(dst: &Path, language: Language) -> Result<PathBuf, Error> {
    let out_dir = dst.join("localization").join(language.code());
    fs::create_dir_all(&out_dir)?;
    Ok(out_dir)
}

/// Collects every file under `src` recursively, directory entries
/// sorted by name so runs process files in a stable order.
pub fn walk_files(src: &Path, files: &mut Vec<PathBuf>) -> Result<(), Error> {
    let mut entries: Vec<PathBuf> = fs::read_dir(src)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk_files(&path, files)?;
        } else {
            files.push(path);
        }
    }

    Ok(())
}

#[test]
fn recognizes_source_localization_files() {
    assert!(is_mod_file("units_l_english.yml"));
    assert!(is_mod_file("units_l_english.yaml"));
    assert!(!is_mod_file("units_l_french.yml"));
    assert!(!is_mod_file("units_l_english.txt"));
    assert!(!is_mod_file("readme.md"));
}

#[test]
fn renames_for_the_target_language() {
    assert_eq!(
        destination_file_name("units_l_english.yml", Language::French),
        "units_l_french.yml"
    );
    assert_eq!(
        destination_file_name("gui_l_english.yaml", Language::SimpChinese),
        "gui_l_simp_chinese.yaml"
    );
}

#[test]
fn walks_nested_directories_in_order() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir(root.path().join("b_sub")).unwrap();
    fs::write(root.path().join("b_sub/inner_l_english.yml"), "l_english:\n").unwrap();
    fs::write(root.path().join("a_l_english.yml"), "l_english:\n").unwrap();
    fs::write(root.path().join("z_notes.txt"), "notes").unwrap();

    let mut files = Vec::new();
    walk_files(root.path(), &mut files).unwrap();

    let names: Vec<String> = files
        .iter()
        .map(|p| {
            p.strip_prefix(root.path())
                .unwrap()
                .display()
                .to_string()
        })
        .collect();
    assert_eq!(
        names,
        vec!["a_l_english.yml", "b_sub/inner_l_english.yml", "z_notes.txt"]
    );
}
