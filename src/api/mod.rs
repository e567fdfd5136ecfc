//!
//! _Translation gateway_
//!
//! The orchestrator talks to the remote model through the
//! [`TranslateBatch`] seam; [`chat_completion::ChatGateway`] is the
//! production implementation. Retry and key-set verification live here
//! so both are testable without a network.
//!

use std::time::Duration;

use indexmap::IndexMap;
use log::warn;

use crate::error::Error;
use crate::utils::languages::Language;

pub mod chat_completion;

/// One remote translation call: a batch of key/text pairs in, the same
/// keys with translated text out.
pub trait TranslateBatch {
    /// Translates every value in `batch` into `language`.
    ///
    /// Implementations must not add, drop or rename keys; the caller
    /// verifies the returned key set with [`verify_batch_keys`].
    fn translate(
        &self,
        batch: &IndexMap<String, String>,
        language: Language,
    ) -> Result<IndexMap<String, String>, Error>;
}

/// Runs `op` up to `attempts` times, sleeping `delay` between tries.
///
/// Only transient errors are retried; anything else returns
/// immediately. After the budget is spent the last error propagates.
/// The sleep function is injected so tests can run on a fake clock.
pub(crate) fn with_retries<T>(
    attempts: u32,
    delay: Duration,
    sleep: fn(Duration),
    mut op: impl FnMut(u32) -> Result<T, Error>,
) -> Result<T, Error> {
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < attempts => {
                warn!("attempt {attempt}/{attempts} failed: {err}, retrying in {delay:?}");
                sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Checks that a translated batch came back with exactly the requested
/// key set. A mismatch is a correctness bug in the response and must
/// not be merged.
pub fn verify_batch_keys(
    request: &IndexMap<String, String>,
    response: &IndexMap<String, String>,
) -> Result<(), Error> {
    let missing: Vec<String> = request
        .keys()
        .filter(|k| !response.contains_key(*k))
        .cloned()
        .collect();
    let unexpected: Vec<String> = response
        .keys()
        .filter(|k| !request.contains_key(*k))
        .cloned()
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(Error::KeyMismatch {
            missing,
            unexpected,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn no_sleep(_: Duration) {}

    fn pair_map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn stops_after_the_attempt_budget() {
        let calls = Cell::new(0u32);
        let result: Result<(), Error> = with_retries(5, Duration::ZERO, no_sleep, |_| {
            calls.set(calls.get() + 1);
            Err(Error::Transport("boom".to_string()))
        });

        assert!(matches!(result, Err(Error::Transport(_))));
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let calls = Cell::new(0u32);
        let result = with_retries(3, Duration::ZERO, no_sleep, |attempt| {
            calls.set(calls.get() + 1);
            if attempt < 3 {
                Err(Error::InvalidResponse("not json yet".to_string()))
            } else {
                Ok(attempt)
            }
        });

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn does_not_retry_fatal_errors() {
        let calls = Cell::new(0u32);
        let result: Result<(), Error> = with_retries(5, Duration::ZERO, no_sleep, |_| {
            calls.set(calls.get() + 1);
            Err(Error::Format("bad grammar".to_string()))
        });

        assert!(matches!(result, Err(Error::Format(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn accepts_matching_key_sets() {
        let request = pair_map(&[("a", "1"), ("b", "2")]);
        let response = pair_map(&[("b", "deux"), ("a", "un")]);

        assert!(verify_batch_keys(&request, &response).is_ok());
    }

    #[test]
    fn rejects_mismatched_key_sets() {
        let request = pair_map(&[("a", "1"), ("b", "2")]);
        let response = pair_map(&[("a", "x"), ("c", "y")]);

        let err = verify_batch_keys(&request, &response).unwrap_err();
        match err {
            Error::KeyMismatch {
                missing,
                unexpected,
            } => {
                assert_eq!(missing, vec!["b".to_string()]);
                assert_eq!(unexpected, vec!["c".to_string()]);
            }
            other => panic!("expected KeyMismatch, got {other:?}"),
        }
    }
}
