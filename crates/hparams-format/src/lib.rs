//! Line-oriented parameter files.
//!
//! Each meaningful line has the shape `keypath = value`. Everything from the
//! first `#` is a comment, blank lines are ignored, and the first `=` splits
//! key from value. Parsed assignments are inserted into a
//! [`HierarchicalStore`](hparams_store::HierarchicalStore), whose separator
//! decides how keypaths nest.
//!
//! # Key Types
//!
//! - [`LineParser`] -- tokenizes lines and loads files under a [`LoadPolicy`]
//! - [`ParserConfig`] -- comment and assignment markers
//! - [`LoadReport`] -- counts of applied and skipped lines
//! - [`render`] -- writes a store back out as lines

pub mod error;
pub mod loader;
pub mod parser;
pub mod render;

pub use error::{ParseError, ParseResult};
pub use loader::{parse_str, LoadReport};
pub use parser::{Assignment, LineParser, LoadPolicy, ParserConfig};
pub use render::render;
