//! Command disambiguation
//!
//! Runs the grammar table over a piece of scanned text and resolves every
//! bracket match to at most one interpretation. A seen-set keyed on the exact
//! matched substring guarantees no raw token is resolved twice, which also
//! collapses identical repeated commands into one; the model tends to repeat
//! itself when asked to emphasize.

use std::collections::HashSet;

use super::grammar;
use super::types::ResolvedCommand;

/// Outcome of the dispatch loop over one piece of text.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Commands in left-to-right match order
    pub commands: Vec<ResolvedCommand>,
    /// Byte spans of every recognized command substring, for prose stripping
    pub spans: Vec<(usize, usize)>,
    /// Raw tokens that matched a pattern but could not be read (bad numerics)
    pub rejected: Vec<String>,
}

/// Resolve all command tokens in `text`. `current_page` fills in for commands
/// that omit a page.
pub fn resolve(text: &str, current_page: u32) -> Resolution {
    let mut resolution = Resolution::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for rule in grammar::rules() {
        for caps in rule.pattern.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            let raw = m.as_str();

            if seen.contains(raw) {
                // already claimed (or already skipped); still strip it
                resolution.spans.push((m.start(), m.end()));
                continue;
            }

            match (rule.read)(&caps, current_page) {
                Ok(Some(reading)) => {
                    seen.insert(raw);
                    resolution.spans.push((m.start(), m.end()));
                    resolution.commands.push(ResolvedCommand {
                        raw: raw.to_string(),
                        kind: rule.kind,
                        variant: rule.variant,
                        start: m.start(),
                        page: reading.page,
                        x: reading.x,
                        y: reading.y,
                        shape: reading.shape,
                        color: reading.color,
                    });
                }
                // predicate rejected this reading; a later rule may claim it
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(raw, error = %err, "skipping malformed command");
                    seen.insert(raw);
                    resolution.spans.push((m.start(), m.end()));
                    resolution.rejected.push(raw.to_string());
                }
            }
        }
    }

    resolution.commands.sort_by_key(|c| c.start);
    resolution
}
