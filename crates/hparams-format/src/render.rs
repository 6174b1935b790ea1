//! Writing a store back out in the line format.

use hparams_store::HierarchicalStore;

use crate::error::{ParseError, ParseResult};
use crate::parser::ParserConfig;

/// Render every scalar of `store` as a `keypath = value` line.
///
/// Lines follow the store's insertion order. Fails with
/// [`ParseError::Unrepresentable`] for any parameter that would not read back
/// unchanged: keys holding the comment or assignment marker, values holding
/// the comment marker, line breaks anywhere, or surrounding whitespace.
/// Fails with [`ParseError::InvalidConfig`] if the two markers coincide.
pub fn render(store: &HierarchicalStore, config: &ParserConfig) -> ParseResult<String> {
    config.validate()?;
    let mut out = String::new();
    for (keypath, value) in store.flatten() {
        check_representable(&keypath, &value, config)?;
        out.push_str(&keypath);
        out.push(' ');
        out.push(config.assignment);
        if !value.is_empty() {
            out.push(' ');
            out.push_str(&value);
        }
        out.push('\n');
    }
    Ok(out)
}

fn check_representable(keypath: &str, value: &str, config: &ParserConfig) -> ParseResult<()> {
    let reason = if keypath.contains(config.comment) || keypath.contains(config.assignment) {
        Some("key contains a comment or assignment marker".to_string())
    } else if keypath.trim() != keypath {
        Some("key has surrounding whitespace".to_string())
    } else if value.contains(config.comment) {
        Some(format!("value contains the comment marker {:?}", config.comment))
    } else if value.trim() != value {
        Some("value has surrounding whitespace".to_string())
    } else if keypath.contains(['\n', '\r']) || value.contains(['\n', '\r']) {
        Some("contains a line break".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ParseError::Unrepresentable {
            keypath: keypath.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
