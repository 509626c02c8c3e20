//! Navigation cue types

use serde::{Deserialize, Serialize};

/// Offset added to the current page for "last page" requests. Deliberately
/// far out of range: the extractor has no idea how long the document is, so
/// the consumer clamps to the real page count.
pub const LAST_PAGE_OFFSET: u32 = 9999;

/// Settle delay suggested for explicit bracket commands.
pub const BRACKET_DELAY_MS: u64 = 400;
/// Settle delay suggested for natural-language phrasing.
pub const NATURAL_DELAY_MS: u64 = 500;

/// A page-navigation intent found in one fragment.
///
/// `delay_ms` is a presentation hint (give in-flight rendering a moment to
/// settle before jumping), not a scheduling guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationCue {
    pub target_page: Option<u32>,
    pub delay_ms: u64,
    pub has_navigation: bool,
}

impl NavigationCue {
    pub fn none() -> Self {
        Self {
            target_page: None,
            delay_ms: 0,
            has_navigation: false,
        }
    }

    pub fn to_page(target: u32, delay_ms: u64) -> Self {
        Self {
            target_page: Some(target),
            delay_ms,
            has_navigation: true,
        }
    }
}
