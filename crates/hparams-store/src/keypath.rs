//! Keypath splitting and key validation.
//!
//! A keypath is a sequence of keys joined by the store's separator, e.g.
//! `tasks.sieve.lim0`. Rules:
//! - Must be non-empty
//! - Every segment between separators must be non-empty
//! - Consequently must not start or end with the separator, nor contain two
//!   separators in a row

use crate::error::{Result, StoreError};

/// Split a keypath into its segments.
///
/// The returned vector is never empty; its last element is the terminal key
/// and the rest form the directory path.
///
/// # Examples
///
/// ```
/// use hparams_store::keypath::split_keypath;
///
/// assert_eq!(split_keypath("bar.baz.c", '.').unwrap(), vec!["bar", "baz", "c"]);
/// assert!(split_keypath("bar..c", '.').is_err());
/// assert!(split_keypath("", '.').is_err());
/// ```
pub fn split_keypath(keypath: &str, separator: char) -> Result<Vec<&str>> {
    if keypath.is_empty() {
        return Err(StoreError::InvalidKeyPath {
            keypath: String::new(),
            reason: "keypath must not be empty".into(),
        });
    }

    let segments: Vec<&str> = keypath.split(separator).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(StoreError::InvalidKeyPath {
            keypath: keypath.to_string(),
            reason: format!("segments between {separator:?} must not be empty"),
        });
    }
    Ok(segments)
}

/// Validate a single key as it would appear inside one node.
pub fn validate_key(key: &str, separator: char) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKeyPath {
            keypath: key.to_string(),
            reason: "key must not be empty".into(),
        });
    }
    if key.contains(separator) {
        return Err(StoreError::InvalidKeyPath {
            keypath: key.to_string(),
            reason: format!("key must not contain the separator {separator:?}"),
        });
    }
    Ok(())
}

/// Join segments back into a keypath.
pub fn join_keypath<S: AsRef<str>>(segments: &[S], separator: char) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        out.push_str(segment.as_ref());
    }
    out
}
