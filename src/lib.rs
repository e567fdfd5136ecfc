#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(test, deny(warnings))]

//! # v3-mod-translator
//!
//! Translates Victoria 3 mod localization files from English into
//! another supported language by batching entries and delegating to an
//! LLM chat-completion call.
//!
//! The pipeline per file: parse the `key:index "text"` format, pack
//! the string entries into size-bounded batches, translate each batch
//! as one JSON object, merge the results while keeping the original
//! numeric indexes, and write the re-serialized file to the mirrored
//! destination tree.
//!
//! ```text
//! my_mod/
//! ├── localization/
//! │   └── english/
//! │       └── gui_l_english.yml
//! └── ...
//! ```
//!
//! becomes `<dst>/localization/french/gui_l_french.yml` and so on.
//!
//! # Usage
//!
//! The API key is read from the environment (a `.env` file works too):
//!
//! - **OPENAI_API_KEY = "xyz"** (required)
//! - **OPENAI_PROXY = "http://..."** (optional)
//! - **OPENAI_API_BASE = "https://..."** (optional override)
//!
//! ```rust,no_run
//! use v3_mod_translator::{Config, Language, ModTranslator};
//!
//! fn main() {
//!     env_logger::init();
//!     dotenvy::dotenv().ok();
//!
//!     let config = Config::from_env("gpt-3.5-turbo").unwrap();
//!     let translator = ModTranslator::new(&config).unwrap();
//!     translator
//!         .translate_mod_files("./my_mod".as_ref(), "./out".as_ref(), Language::French)
//!         .unwrap();
//! }
//! ```

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::{error, info};

use crate::api::TranslateBatch;
use crate::api::chat_completion::ChatGateway;
use crate::codec::{LocaleEntry, LocaleFile, LocaleValue};

pub mod api;
pub mod batch;
pub mod codec;
pub mod config;
pub mod error;
mod utils;

pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::utils::languages::Language;

/// Root key every source file must nest its entries under.
const SOURCE_ROOT_KEY: &str = "l_english";

/// Translates a mod's localization files file by file, one batch and
/// one network call at a time.
#[derive(Debug)]
pub struct ModTranslator<G: TranslateBatch> {
    gateway: G,
    threshold: usize,
}

impl ModTranslator<ChatGateway> {
    /// Builds a translator backed by the chat-completion gateway.
    pub fn new(config: &Config) -> Result<Self, Error> {
        Ok(ModTranslator {
            gateway: ChatGateway::new(config)?,
            threshold: config.batch_threshold,
        })
    }
}

impl<G: TranslateBatch> ModTranslator<G> {
    /// Builds a translator over any gateway; used with stub gateways
    /// in tests.
    pub fn with_gateway(gateway: G, threshold: usize) -> Self {
        ModTranslator { gateway, threshold }
    }

    /// Walks `src` and translates every `*_l_english.yml`/`.yaml` file
    /// into `<dst>/localization/<language_code>/`.
    ///
    /// A failing file is logged and skipped; the remaining files still
    /// run, and the first failure surfaces afterwards as
    /// [`Error::FailedFiles`] so the process exits non-zero.
    pub fn translate_mod_files(
        &self,
        src: &Path,
        dst: &Path,
        language: Language,
    ) -> Result<(), Error> {
        let out_dir = utils::create_output_directory(dst, language)?;

        info!(
            "Translating {} to {} for {}",
            src.display(),
            dst.display(),
            language.display_name()
        );

        let mut files = Vec::new();
        utils::walk_files(src, &mut files)?;

        let mut failed = 0usize;
        for path in files {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !utils::is_mod_file(file_name) {
                continue;
            }

            info!("Translating {file_name}");
            if let Err(err) = self.translate_mod_file(&path, file_name, &out_dir, language) {
                error!(
                    "{}: translation to {} failed: {err}",
                    path.display(),
                    language.code()
                );
                failed += 1;
            }
        }

        if failed > 0 {
            Err(Error::FailedFiles(failed))
        } else {
            Ok(())
        }
    }

    fn translate_mod_file(
        &self,
        path: &Path,
        file_name: &str,
        out_dir: &Path,
        language: Language,
    ) -> Result<(), Error> {
        let raw = fs::read(path)?;
        let source = codec::parse(&raw)?;

        if source.language != SOURCE_ROOT_KEY {
            return Err(Error::Format(format!(
                "root key is `{}`, expected `{SOURCE_ROOT_KEY}`",
                source.language
            )));
        }

        let translated = self.translate_file(&source, language)?;

        // the destination file only comes into existence once the whole
        // file translated successfully
        let out_path = out_dir.join(utils::destination_file_name(file_name, language));
        fs::write(out_path, codec::serialize(&translated))?;

        Ok(())
    }

    /// Translates one parsed file in memory.
    ///
    /// Text entries are batched and sent through the gateway; each
    /// response is checked for key-set equality before merging. Source
    /// indexes and nested values carry over untouched, and entry order
    /// is preserved.
    pub fn translate_file(
        &self,
        source: &LocaleFile,
        language: Language,
    ) -> Result<LocaleFile, Error> {
        let mut translated_text: IndexMap<String, String> = IndexMap::new();

        for batch in batch::make_batches(&source.entries, self.threshold) {
            let result = self.gateway.translate(&batch, language)?;
            api::verify_batch_keys(&batch, &result)?;
            translated_text.extend(result);
        }

        let entries = source
            .entries
            .iter()
            .map(|(key, entry)| {
                let value = match &entry.value {
                    LocaleValue::Text(_) => match translated_text.get(key) {
                        Some(text) => LocaleValue::Text(text.clone()),
                        None => entry.value.clone(),
                    },
                    nested => nested.clone(),
                };
                (
                    key.clone(),
                    LocaleEntry {
                        index: entry.index,
                        value,
                    },
                )
            })
            .collect();

        Ok(LocaleFile {
            language: language.root_key(),
            entries,
            bom: source.bom,
        })
    }
}
