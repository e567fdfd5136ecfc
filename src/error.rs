//!
//! _Error taxonomy_
//!
//! One crate-wide error enum; `is_transient` marks the variants the
//! gateway retry loop is allowed to re-attempt.
//!

use std::io;

use thiserror::Error;

/// Errors raised while translating mod localization files
#[derive(Error, Debug)]
pub enum Error {
    /// The required API key variable is absent from the environment
    #[error("environment variable `{0}` is not set")]
    MissingApiKey(&'static str),

    /// The requested language code is not in the supported set
    #[error("the language `{0}` is not supported")]
    UnsupportedLanguage(String),

    /// The proxy url from the environment could not be parsed
    #[error("invalid proxy url: {0}")]
    InvalidProxy(String),

    /// Network or HTTP-level failure while talking to the completion API
    #[error("translation request failed: {0}")]
    Transport(String),

    /// The completion text was not a valid JSON object of strings
    #[error("translation response is not a valid JSON object: {0}")]
    InvalidResponse(String),

    /// The translated key set differs from the request batch
    #[error("translated keys do not match the request (missing: {missing:?}, unexpected: {unexpected:?})")]
    KeyMismatch {
        /// Keys present in the request but absent from the response
        missing: Vec<String>,
        /// Keys present in the response but absent from the request
        unexpected: Vec<String>,
    },

    /// The source file does not follow the `key:index "text"` grammar
    #[error("malformed localization file: {0}")]
    Format(String),

    /// Filesystem failure while reading sources or writing outputs
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Summary error when one or more files failed during a run
    #[error("translation failed for {0} file(s)")]
    FailedFiles(usize),
}

impl Error {
    /// Whether the retry loop may re-attempt after this error.
    ///
    /// Only gateway-level failures qualify; format, integrity and
    /// configuration errors repeat identically on every attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::InvalidResponse(_))
    }
}

#[test]
fn transient_classification() {
    assert!(Error::Transport("connection reset".to_string()).is_transient());
    assert!(Error::InvalidResponse("trailing garbage".to_string()).is_transient());
    assert!(!Error::Format("no header".to_string()).is_transient());
    assert!(
        !Error::KeyMismatch {
            missing: vec!["a".to_string()],
            unexpected: vec![],
        }
        .is_transient()
    );
    assert!(!Error::MissingApiKey("OPENAI_API_KEY").is_transient());
}
