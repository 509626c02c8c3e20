//! Bracket command extraction
//!
//! The model embeds `[KEYWORD args]` directives inside its prose. This module
//! finds them in a live fragment stream without ever letting one leak into the
//! text shown to the reader:
//!
//! - `recognizer`: chunk-boundary-safe scanning and prose stripping
//! - `grammar`: the priority-ordered table of bracket syntaxes
//! - `resolver`: the dispatch loop assigning each match one interpretation

pub mod grammar;
pub mod recognizer;
pub mod resolver;
pub mod types;

pub use recognizer::{CommandRecognizer, ScanOutcome, PENDING_BUFFER_MAX};
pub use resolver::{resolve, Resolution};
pub use types::{CommandError, CommandKind, GrammarVariant, ResolvedCommand, Shape};
