//! Page navigation cues
//!
//! Recognizes "take the reader somewhere" intent in model output, both the
//! explicit bracket commands and loose natural-language phrasing.

pub mod extractor;
pub mod types;

pub use extractor::extract;
pub use types::{NavigationCue, BRACKET_DELAY_MS, LAST_PAGE_OFFSET, NATURAL_DELAY_MS};
