//! Streaming command recognizer
//!
//! Fragments arrive from a live token stream, so a bracket command can be cut
//! anywhere: `"...[HIGH"` in one fragment, `"LIGHT 1 100 200 300 50]..."` in
//! the next. The recognizer holds back any trailing unterminated bracket that
//! still looks like the start of a command and prepends it to the next
//! fragment, so only fully-closed brackets ever reach the grammar. Everything
//! it recognizes is stripped from the prose handed back to the caller.

use once_cell::sync::Lazy;
use regex::Regex;

use super::resolver::{self, Resolution};
use super::types::ResolvedCommand;

/// Upper bound on the carry-over buffer. A "command" that grows past this
/// without closing its bracket is flushed back into the prose.
pub const PENDING_BUFFER_MAX: usize = 200;

/// Keywords a held-back bracket may be the start of.
const KEYWORDS: [&str; 8] = [
    "HIGHLIGHT",
    "CIRCLE",
    "GO TO PAGE",
    "NEXT PAGE",
    "PREV PAGE",
    "PREVIOUS PAGE",
    "FIRST PAGE",
    "LAST PAGE",
];

static KEYWORD_QUICK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)HIGHLIGHT|CIRCLE").expect("valid keyword probe pattern"));

/// The model sometimes glues a keyword to its first digit (`HIGHLIGHT1 ...`).
static GLUED_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(HIGHLIGHT|CIRCLE)(\d)").expect("valid glued keyword pattern"));

/// A closed annotation bracket the grammar could not read, e.g.
/// `[HIGHLIGHT the title]`. Stripped from prose, and still counts as command
/// intent for fallback purposes.
static ANNOTATION_LEFTOVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\s*(?:HIGHLIGHT|CIRCLE)\b[^\[\]]*\]").expect("valid leftover pattern")
});

/// Navigation brackets are commands too; they are stripped from the prose
/// here and read by the navigation extractor from the scanned text.
static NAV_BRACKET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\[\s*(?:GO\s+TO\s+PAGE\s+\d+|NEXT\s+PAGE|PREV(?:IOUS)?\s+PAGE|FIRST\s+PAGE|LAST\s+PAGE)\s*\]",
    )
    .expect("valid navigation bracket pattern")
});

static SPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid space run pattern"));

/// What one fragment scan produced.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Fragment prose with every recognized command substring removed
    pub prose: String,
    /// The full text examined this round (previous carry-over + fragment,
    /// minus any newly held-back suffix); navigation extraction reads this
    pub scanned: String,
    /// Resolved annotation commands, left-to-right
    pub commands: Vec<ResolvedCommand>,
    /// Raw text of every annotation token sighted, usable or not
    pub raw_tokens: Vec<String>,
    /// True when any annotation command token was detected, even one that
    /// produced no usable reading
    pub had_commands: bool,
}

/// Chunk-boundary-safe command scanner. One per stream.
#[derive(Debug, Default)]
pub struct CommandRecognizer {
    pending: String,
}

impl CommandRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently held-back fragment suffix, if any.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Flush the carry-over buffer at end of stream. Whatever never closed
    /// its bracket is plain prose after all.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    /// Scan one fragment. `current_page` fills in for commands without an
    /// explicit page.
    pub fn scan(&mut self, fragment: &str, current_page: u32) -> ScanOutcome {
        let combined = if self.pending.is_empty() {
            fragment.to_string()
        } else {
            let mut s = std::mem::take(&mut self.pending);
            s.push_str(fragment);
            s
        };

        // fast path: nothing bracket-like and no keyword anywhere
        if !combined.contains('[') && !KEYWORD_QUICK.is_match(&combined) {
            return ScanOutcome {
                prose: combined.clone(),
                scanned: combined,
                commands: Vec::new(),
                raw_tokens: Vec::new(),
                had_commands: false,
            };
        }

        let normalized = GLUED_KEYWORD.replace_all(&combined, "$1 $2").into_owned();

        let (scanned, held) = split_carry(&normalized);
        self.pending = held.to_string();
        let scanned = scanned.to_string();

        let Resolution {
            commands,
            mut spans,
            rejected,
        } = resolver::resolve(&scanned, current_page);

        let mut had_commands = !spans.is_empty();
        let mut mutated = !spans.is_empty();
        let mut prose = strip_spans(&scanned, &mut spans);

        let mut raw_tokens: Vec<String> = commands.iter().map(|c| c.raw.clone()).collect();
        raw_tokens.extend(rejected);

        if ANNOTATION_LEFTOVER.is_match(&prose) {
            had_commands = true;
            mutated = true;
            for m in ANNOTATION_LEFTOVER.find_iter(&prose) {
                raw_tokens.push(m.as_str().to_string());
            }
            prose = ANNOTATION_LEFTOVER.replace_all(&prose, "").into_owned();
        }

        if NAV_BRACKET.is_match(&prose) {
            mutated = true;
            prose = NAV_BRACKET.replace_all(&prose, "").into_owned();
        }

        // tidy the seams left by removal
        if mutated {
            prose = SPACE_RUNS.replace_all(&prose, " ").into_owned();
        }

        ScanOutcome {
            prose,
            scanned,
            commands,
            raw_tokens,
            had_commands,
        }
    }
}

/// Split off a trailing unterminated bracket that could still become a
/// command once the next fragment arrives.
fn split_carry(text: &str) -> (&str, &str) {
    let Some(idx) = text.rfind('[') else {
        return (text, "");
    };

    let tail = &text[idx..];
    if tail.contains(']') {
        return (text, "");
    }
    if tail.len() > PENDING_BUFFER_MAX {
        // never closed; it was prose all along
        return (text, "");
    }

    if carry_candidate(tail) {
        (&text[..idx], tail)
    } else {
        (text, "")
    }
}

/// True when the text after `[` is a prefix of a known keyword, or a full
/// keyword with arguments still streaming in.
fn carry_candidate(tail: &str) -> bool {
    let body = tail[1..].trim_start();
    if body.is_empty() {
        return true;
    }

    let folded = body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();

    KEYWORDS
        .iter()
        .any(|k| k.starts_with(&folded) || folded.starts_with(k))
}

fn strip_spans(text: &str, spans: &mut Vec<(usize, usize)>) -> String {
    if spans.is_empty() {
        return text.to_string();
    }

    spans.sort_unstable();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for &(start, end) in spans.iter() {
        if start < cursor {
            continue;
        }
        out.push_str(&text[cursor..start]);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}
