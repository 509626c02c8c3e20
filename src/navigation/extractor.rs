//! Navigation cue extraction
//!
//! Scans a fragment for page-navigation intent, independently of annotation
//! parsing. Explicit bracket commands always beat natural-language phrasing;
//! within each class the forms are checked in a fixed order and the first hit
//! wins.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{NavigationCue, BRACKET_DELAY_MS, LAST_PAGE_OFFSET, NATURAL_DELAY_MS};

static BRACKET_GO_TO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\s*GO\s+TO\s+PAGE\s+(\d+)\s*\]").expect("valid go-to-page pattern")
});
static BRACKET_NEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[\s*NEXT\s+PAGE\s*\]").expect("valid next-page pattern"));
static BRACKET_PREV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\s*PREV(?:IOUS)?\s+PAGE\s*\]").expect("valid prev-page pattern")
});
static BRACKET_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[\s*FIRST\s+PAGE\s*\]").expect("valid first-page pattern"));
static BRACKET_LAST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[\s*LAST\s+PAGE\s*\]").expect("valid last-page pattern"));

static NATURAL_GO_TO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:go\s+to|turn\s+to|navigate\s+to|show|open|jump\s+to)\s+page\s+(\d+)\b")
        .expect("valid natural go-to pattern")
});
static NATURAL_NEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bnext\s+page\b").expect("valid natural next pattern"));
static NATURAL_PREV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bprev(?:ious)?\s+page\b").expect("valid natural prev pattern"));
static NATURAL_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bfirst\s+page\b").expect("valid natural first pattern"));
static NATURAL_LAST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\blast\s+page\b").expect("valid natural last pattern"));

/// Extract at most one navigation cue from `text`. `current_page` anchors the
/// relative forms.
pub fn extract(text: &str, current_page: u32) -> NavigationCue {
    if let Some(target) = bracket_target(text, current_page) {
        return NavigationCue::to_page(target, BRACKET_DELAY_MS);
    }
    if let Some(target) = natural_target(text, current_page) {
        return NavigationCue::to_page(target, NATURAL_DELAY_MS);
    }
    NavigationCue::none()
}

fn bracket_target(text: &str, current_page: u32) -> Option<u32> {
    if let Some(caps) = BRACKET_GO_TO.captures(text) {
        if let Some(page) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
            return Some(page.max(1));
        }
    }
    if BRACKET_NEXT.is_match(text) {
        return Some(current_page.saturating_add(1));
    }
    if BRACKET_PREV.is_match(text) {
        return Some(current_page.saturating_sub(1).max(1));
    }
    if BRACKET_FIRST.is_match(text) {
        return Some(1);
    }
    if BRACKET_LAST.is_match(text) {
        return Some(current_page.saturating_add(LAST_PAGE_OFFSET));
    }
    None
}

fn natural_target(text: &str, current_page: u32) -> Option<u32> {
    if let Some(caps) = NATURAL_GO_TO.captures(text) {
        if let Some(page) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
            return Some(page.max(1));
        }
    }
    if NATURAL_NEXT.is_match(text) {
        return Some(current_page.saturating_add(1));
    }
    if NATURAL_PREV.is_match(text) {
        return Some(current_page.saturating_sub(1).max(1));
    }
    if NATURAL_FIRST.is_match(text) {
        return Some(1);
    }
    if NATURAL_LAST.is_match(text) {
        return Some(current_page.saturating_add(LAST_PAGE_OFFSET));
    }
    None
}
