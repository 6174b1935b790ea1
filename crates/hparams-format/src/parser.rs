//! Tokenizing a single `key = value` line.

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Characters that give the line format its structure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Everything from the first occurrence of this character to the end of
    /// the line is discarded.
    pub comment: char,
    /// The first occurrence of this character splits key from value.
    pub assignment: char,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            comment: '#',
            assignment: '=',
        }
    }
}

impl ParserConfig {
    /// Check that the markers can be told apart.
    pub fn validate(&self) -> ParseResult<()> {
        if self.comment == self.assignment {
            return Err(ParseError::InvalidConfig {
                reason: format!(
                    "comment and assignment markers are both {:?}",
                    self.comment
                ),
            });
        }
        Ok(())
    }
}

/// A trimmed `(keypath, value)` pair taken from one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    pub value: String,
}

/// What to do with a line that fails to parse or insert.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadPolicy {
    /// Stop at the first bad line and return its error.
    #[default]
    Strict,
    /// Log the bad line, count it, and keep going.
    SkipInvalid,
}

/// Splits parameter file lines into assignments and feeds them to a store.
#[derive(Clone, Debug, Default)]
pub struct LineParser {
    pub(crate) config: ParserConfig,
    pub(crate) policy: LoadPolicy,
}

impl LineParser {
    /// Create a strict parser with the given configuration.
    ///
    /// Fails with [`ParseError::InvalidConfig`] if both markers are the same
    /// character.
    pub fn new(config: ParserConfig) -> ParseResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            policy: LoadPolicy::Strict,
        })
    }

    /// Set the policy applied to bad lines when loading.
    pub fn with_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The parser configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The bad-line policy.
    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Tokenize one line.
    ///
    /// Returns `Ok(None)` for lines that are blank once the comment is
    /// stripped. Only the first assignment character splits; the rest
    /// belong to the value. There is no quoting or escaping.
    ///
    /// # Examples
    ///
    /// ```
    /// use hparams_format::LineParser;
    ///
    /// let parser = LineParser::default();
    /// let a = parser.parse_line("  bar.baz.c = 6  # comment").unwrap().unwrap();
    /// assert_eq!((a.key.as_str(), a.value.as_str()), ("bar.baz.c", "6"));
    /// assert!(parser.parse_line("# only a comment").unwrap().is_none());
    /// assert!(parser.parse_line("nomarkerhere").is_err());
    /// ```
    pub fn parse_line(&self, line: &str) -> ParseResult<Option<Assignment>> {
        let content = match line.split_once(self.config.comment) {
            Some((before, _)) => before,
            None => line,
        }
        .trim();
        if content.is_empty() {
            return Ok(None);
        }

        let (key, value) = content
            .split_once(self.config.assignment)
            .ok_or_else(|| ParseError::Format {
                line: line.to_string(),
            })?;
        Ok(Some(Assignment {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        }))
    }
}
