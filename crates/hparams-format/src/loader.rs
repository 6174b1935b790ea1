//! Loading whole parameter files into a store.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use hparams_store::HierarchicalStore;
use tracing::{debug, warn};

use crate::error::{ParseError, ParseResult};
use crate::parser::{LineParser, LoadPolicy};

/// Outcome of a successful load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Assignments inserted into the store.
    pub applied: usize,
    /// Bad lines passed over under [`LoadPolicy::SkipInvalid`].
    pub skipped: usize,
}

impl LineParser {
    /// Parse one line and insert its assignment, if any.
    ///
    /// Returns `Ok(true)` if something was inserted and `Ok(false)` for a
    /// blank or comment-only line. The policy is not consulted.
    pub fn apply_line(&self, store: &mut HierarchicalStore, line: &str) -> ParseResult<bool> {
        match self.parse_line(line)? {
            Some(assignment) => {
                store.insert(&assignment.key, assignment.value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Load every line of `text` into `store`.
    pub fn load_str(&self, store: &mut HierarchicalStore, text: &str) -> ParseResult<LoadReport> {
        let mut report = LoadReport::default();
        for (idx, line) in text.lines().enumerate() {
            let outcome = self.apply_line(store, line);
            self.record(outcome, idx + 1, &mut report)?;
        }
        debug!(applied = report.applied, skipped = report.skipped, "parameters loaded");
        Ok(report)
    }

    /// Load every line read from `reader` into `store`.
    ///
    /// Lines are split on `\n` (a trailing `\r` is dropped) and decoded one
    /// at a time, so a line that is not valid UTF-8 is handled by the policy
    /// like any other bad line. Read failures always abort.
    pub fn load_reader<R: BufRead>(
        &self,
        store: &mut HierarchicalStore,
        reader: R,
    ) -> ParseResult<LoadReport> {
        let mut report = LoadReport::default();
        for (idx, bytes) in reader.split(b'\n').enumerate() {
            let bytes = bytes?;
            let raw = bytes.strip_suffix(b"\r").unwrap_or(&bytes[..]);
            let outcome = std::str::from_utf8(raw)
                .map_err(ParseError::from)
                .and_then(|line| self.apply_line(store, line));
            self.record(outcome, idx + 1, &mut report)?;
        }
        debug!(applied = report.applied, skipped = report.skipped, "parameters loaded");
        Ok(report)
    }

    /// Load the parameter file at `path` into `store`.
    pub fn load_file(
        &self,
        store: &mut HierarchicalStore,
        path: impl AsRef<Path>,
    ) -> ParseResult<LoadReport> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading parameter file");
        let file = File::open(path)?;
        self.load_reader(store, BufReader::new(file))
    }

    fn record(
        &self,
        outcome: ParseResult<bool>,
        number: usize,
        report: &mut LoadReport,
    ) -> ParseResult<()> {
        match outcome {
            Ok(true) => report.applied += 1,
            Ok(false) => {}
            Err(e) => match self.policy {
                LoadPolicy::Strict => {
                    return Err(ParseError::AtLine {
                        line: number,
                        source: Box::new(e),
                    });
                }
                LoadPolicy::SkipInvalid => {
                    warn!(line = number, error = %e, "skipping invalid parameter line");
                    report.skipped += 1;
                }
            },
        }
        Ok(())
    }
}

/// Parse `text` into a fresh store using default markers and separator.
pub fn parse_str(text: &str) -> ParseResult<HierarchicalStore> {
    let mut store = HierarchicalStore::new();
    LineParser::default().load_str(&mut store, text)?;
    Ok(store)
}
