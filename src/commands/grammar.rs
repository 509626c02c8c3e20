//! Command grammar table
//!
//! The five bracket syntaxes for each annotation keyword, as an explicit
//! priority-ordered table. Several variants can match the same digits (a
//! five-number highlight reads as either `page x y w h` or `x y w h page`);
//! the table order plus per-rule predicates resolve every match to exactly
//! one interpretation:
//!
//! 1. page-first, accepted only when the leading number is a plausible page
//!    (≤ 50) and the height/width ratio is sane (h ≤ 3w, highlight only)
//! 2. coordinate-first, over everything rule 1 rejected
//! 3. implicit page (one fewer number, page = current)
//! 4. colon/comma delimited form
//! 5. key=value form, requiring at least one spatial key
//!
//! Keyword matching is case-insensitive throughout.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::types::{CommandError, CommandKind, GrammarVariant, Shape};

/// Pages above this are assumed to be a coordinate misread as a page number.
pub const PAGE_PLAUSIBLE_MAX: u32 = 50;

/// A page-first highlight reading is rejected when height exceeds this
/// multiple of width.
pub const HEIGHT_WIDTH_RATIO_MAX: u32 = 3;

/// Defaults for the highlight key=value form.
pub const KV_DEFAULT_X: u32 = 80;
pub const KV_DEFAULT_Y: u32 = 200;
pub const KV_DEFAULT_WIDTH: u32 = 420;
pub const KV_DEFAULT_HEIGHT: u32 = 60;

/// Defaults for the circle key=value form.
pub const KV_DEFAULT_CIRCLE_X: u32 = 300;
pub const KV_DEFAULT_CIRCLE_Y: u32 = 300;
pub const KV_DEFAULT_RADIUS: u32 = 80;

static HIGHLIGHT_FIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\[\s*HIGHLIGHT\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)(?:\s+color="([^"]*)")?\s*\]"#,
    )
    .expect("valid highlight five-number pattern")
});

static HIGHLIGHT_FOUR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\[\s*HIGHLIGHT\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)(?:\s+color="([^"]*)")?\s*\]"#)
        .expect("valid highlight four-number pattern")
});

static HIGHLIGHT_DELIMITED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\[\s*HIGHLIGHT\s*:\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)(?:\s*,\s*color="([^"]*)")?\s*\]"#,
    )
    .expect("valid highlight delimited pattern")
});

static HIGHLIGHT_KEY_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\[\s*HIGHLIGHT((?:\s+[A-Za-z]+\s*=\s*(?:"[^"]*"|[^\s\]]+))+)\s*\]"#)
        .expect("valid highlight key=value pattern")
});

static CIRCLE_FOUR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\[\s*CIRCLE\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)(?:\s+color="([^"]*)")?\s*\]"#)
        .expect("valid circle four-number pattern")
});

static CIRCLE_THREE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\[\s*CIRCLE\s+(\d+)\s+(\d+)\s+(\d+)(?:\s+color="([^"]*)")?\s*\]"#)
        .expect("valid circle three-number pattern")
});

static CIRCLE_DELIMITED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\[\s*CIRCLE\s*:\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)(?:\s*,\s*color="([^"]*)")?\s*\]"#,
    )
    .expect("valid circle delimited pattern")
});

static CIRCLE_KEY_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\[\s*CIRCLE((?:\s+[A-Za-z]+\s*=\s*(?:"[^"]*"|[^\s\]]+))+)\s*\]"#)
        .expect("valid circle key=value pattern")
});

static KEY_VALUE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z]+)\s*=\s*(?:"([^"]*)"|([^\s\]]+))"#).expect("valid key=value pair pattern")
});

/// One interpretation of a matched bracket, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub page: u32,
    pub x: u32,
    pub y: u32,
    pub shape: Shape,
    pub color: Option<String>,
}

type ReadFn = fn(&Captures, u32) -> Result<Option<Reading>, CommandError>;

/// A grammar rule: pattern plus the reading it assigns to a match.
///
/// `read` returns `Ok(None)` when the rule's disambiguation predicate rejects
/// the match, leaving it for a lower-priority rule to claim.
pub struct GrammarRule {
    pub kind: CommandKind,
    pub variant: GrammarVariant,
    pub pattern: &'static Lazy<Regex>,
    pub read: ReadFn,
}

/// The dispatch table, highest priority first.
pub fn rules() -> &'static [GrammarRule] {
    static RULES: [GrammarRule; 10] = [
        GrammarRule {
            kind: CommandKind::Highlight,
            variant: GrammarVariant::PageFirst,
            pattern: &HIGHLIGHT_FIVE,
            read: read_highlight_page_first,
        },
        GrammarRule {
            kind: CommandKind::Circle,
            variant: GrammarVariant::PageFirst,
            pattern: &CIRCLE_FOUR,
            read: read_circle_page_first,
        },
        GrammarRule {
            kind: CommandKind::Highlight,
            variant: GrammarVariant::CoordinateFirst,
            pattern: &HIGHLIGHT_FIVE,
            read: read_highlight_coordinate_first,
        },
        GrammarRule {
            kind: CommandKind::Circle,
            variant: GrammarVariant::CoordinateFirst,
            pattern: &CIRCLE_FOUR,
            read: read_circle_coordinate_first,
        },
        GrammarRule {
            kind: CommandKind::Highlight,
            variant: GrammarVariant::ImplicitPage,
            pattern: &HIGHLIGHT_FOUR,
            read: read_highlight_implicit,
        },
        GrammarRule {
            kind: CommandKind::Circle,
            variant: GrammarVariant::ImplicitPage,
            pattern: &CIRCLE_THREE,
            read: read_circle_implicit,
        },
        GrammarRule {
            kind: CommandKind::Highlight,
            variant: GrammarVariant::Delimited,
            pattern: &HIGHLIGHT_DELIMITED,
            read: read_highlight_delimited,
        },
        GrammarRule {
            kind: CommandKind::Circle,
            variant: GrammarVariant::Delimited,
            pattern: &CIRCLE_DELIMITED,
            read: read_circle_delimited,
        },
        GrammarRule {
            kind: CommandKind::Highlight,
            variant: GrammarVariant::KeyValue,
            pattern: &HIGHLIGHT_KEY_VALUE,
            read: read_highlight_key_value,
        },
        GrammarRule {
            kind: CommandKind::Circle,
            variant: GrammarVariant::KeyValue,
            pattern: &CIRCLE_KEY_VALUE,
            read: read_circle_key_value,
        },
    ];
    &RULES
}

fn num(caps: &Captures, idx: usize) -> Result<u32, CommandError> {
    let text = caps.get(idx).map(|m| m.as_str()).unwrap_or_default();
    text.parse::<u32>()
        .map_err(|_| CommandError::BadNumber(text.to_string()))
}

fn color(caps: &Captures, idx: usize) -> Option<String> {
    caps.get(idx).map(|m| m.as_str().to_string())
}

fn read_highlight_page_first(caps: &Captures, _page: u32) -> Result<Option<Reading>, CommandError> {
    let page = num(caps, 1)?;
    let x = num(caps, 2)?;
    let y = num(caps, 3)?;
    let width = num(caps, 4)?;
    let height = num(caps, 5)?;

    if page > PAGE_PLAUSIBLE_MAX || height > HEIGHT_WIDTH_RATIO_MAX.saturating_mul(width) {
        return Ok(None);
    }

    Ok(Some(Reading {
        page,
        x,
        y,
        shape: Shape::Box { width, height },
        color: color(caps, 6),
    }))
}

fn read_highlight_coordinate_first(
    caps: &Captures,
    _page: u32,
) -> Result<Option<Reading>, CommandError> {
    Ok(Some(Reading {
        page: num(caps, 5)?,
        x: num(caps, 1)?,
        y: num(caps, 2)?,
        shape: Shape::Box {
            width: num(caps, 3)?,
            height: num(caps, 4)?,
        },
        color: color(caps, 6),
    }))
}

fn read_highlight_implicit(caps: &Captures, page: u32) -> Result<Option<Reading>, CommandError> {
    Ok(Some(Reading {
        page,
        x: num(caps, 1)?,
        y: num(caps, 2)?,
        shape: Shape::Box {
            width: num(caps, 3)?,
            height: num(caps, 4)?,
        },
        color: color(caps, 5),
    }))
}

fn read_highlight_delimited(caps: &Captures, _page: u32) -> Result<Option<Reading>, CommandError> {
    Ok(Some(Reading {
        page: num(caps, 5)?,
        x: num(caps, 1)?,
        y: num(caps, 2)?,
        shape: Shape::Box {
            width: num(caps, 3)?,
            height: num(caps, 4)?,
        },
        color: color(caps, 6),
    }))
}

fn read_circle_page_first(caps: &Captures, _page: u32) -> Result<Option<Reading>, CommandError> {
    let page = num(caps, 1)?;
    if page > PAGE_PLAUSIBLE_MAX {
        return Ok(None);
    }

    Ok(Some(Reading {
        page,
        x: num(caps, 2)?,
        y: num(caps, 3)?,
        shape: Shape::Dot {
            radius: num(caps, 4)?,
        },
        color: color(caps, 5),
    }))
}

fn read_circle_coordinate_first(
    caps: &Captures,
    _page: u32,
) -> Result<Option<Reading>, CommandError> {
    Ok(Some(Reading {
        page: num(caps, 4)?,
        x: num(caps, 1)?,
        y: num(caps, 2)?,
        shape: Shape::Dot {
            radius: num(caps, 3)?,
        },
        color: color(caps, 5),
    }))
}

fn read_circle_implicit(caps: &Captures, page: u32) -> Result<Option<Reading>, CommandError> {
    Ok(Some(Reading {
        page,
        x: num(caps, 1)?,
        y: num(caps, 2)?,
        shape: Shape::Dot {
            radius: num(caps, 3)?,
        },
        color: color(caps, 4),
    }))
}

fn read_circle_delimited(caps: &Captures, _page: u32) -> Result<Option<Reading>, CommandError> {
    Ok(Some(Reading {
        page: num(caps, 4)?,
        x: num(caps, 1)?,
        y: num(caps, 2)?,
        shape: Shape::Dot {
            radius: num(caps, 3)?,
        },
        color: color(caps, 5),
    }))
}

/// Parsed key=value pairs from a bracket body. Unknown keys are ignored.
#[derive(Debug, Default)]
struct KeyValues {
    x: Option<u32>,
    y: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    radius: Option<u32>,
    page: Option<u32>,
    color: Option<String>,
}

fn parse_key_values(body: &str) -> Result<KeyValues, CommandError> {
    let mut kv = KeyValues::default();

    for caps in KEY_VALUE_PAIR.captures_iter(body) {
        let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();

        let parsed = || {
            value
                .parse::<u32>()
                .map_err(|_| CommandError::BadNumber(value.to_string()))
        };

        match key.to_ascii_lowercase().as_str() {
            "x" => kv.x = Some(parsed()?),
            "y" => kv.y = Some(parsed()?),
            "w" | "width" => kv.width = Some(parsed()?),
            "h" | "height" => kv.height = Some(parsed()?),
            "r" | "radius" => kv.radius = Some(parsed()?),
            "page" => kv.page = Some(parsed()?),
            "color" => kv.color = Some(value.to_string()),
            _ => {}
        }
    }

    Ok(kv)
}

fn read_highlight_key_value(caps: &Captures, page: u32) -> Result<Option<Reading>, CommandError> {
    let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let kv = parse_key_values(body)?;

    // at least one spatial key distinguishes a command from stray prose
    if kv.x.is_none() && kv.y.is_none() && kv.width.is_none() && kv.height.is_none() {
        return Ok(None);
    }

    Ok(Some(Reading {
        page: kv.page.unwrap_or(page),
        x: kv.x.unwrap_or(KV_DEFAULT_X),
        y: kv.y.unwrap_or(KV_DEFAULT_Y),
        shape: Shape::Box {
            width: kv.width.unwrap_or(KV_DEFAULT_WIDTH),
            height: kv.height.unwrap_or(KV_DEFAULT_HEIGHT),
        },
        color: kv.color,
    }))
}

fn read_circle_key_value(caps: &Captures, page: u32) -> Result<Option<Reading>, CommandError> {
    let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let kv = parse_key_values(body)?;

    if kv.x.is_none() && kv.y.is_none() && kv.radius.is_none() {
        return Ok(None);
    }

    Ok(Some(Reading {
        page: kv.page.unwrap_or(page),
        x: kv.x.unwrap_or(KV_DEFAULT_CIRCLE_X),
        y: kv.y.unwrap_or(KV_DEFAULT_CIRCLE_Y),
        shape: Shape::Dot {
            radius: kv.radius.unwrap_or(KV_DEFAULT_RADIUS),
        },
        color: kv.color,
    }))
}
