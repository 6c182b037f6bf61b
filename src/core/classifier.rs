//! Maps a raw status mark to a [`Status`].
//!
//! Two passes. The first character of the mark is looked up in the glyph table; a hit
//! decides immediately. Otherwise the whole mark is matched against keyword groups
//! (Japanese and English, case-insensitive). A mark made of class names (`.a.b`) is
//! matched class by class against a fixed table instead, never by substring. Anything
//! left over is `Unknown`, so parsing noise can never look like an open slot.

use crate::domain::model::Status;
use regex::Regex;
use std::sync::LazyLock;

/// Circle variants.
pub const AVAILABLE_GLYPHS: &[char] = &['○', '◯', '〇', '◎', '⭕', '⚪', '●', '◉'];
/// Triangle variants.
pub const FEW_LEFT_GLYPHS: &[char] = &['△', '▲', '▵', '▴', '⊿', '🔺'];
/// Cross variants.
pub const NOT_AVAILABLE_GLYPHS: &[char] = &['×', '✕', '✖', '✗', '✘', '╳', '⨯', '❌', '☓'];
/// Dashes used for "no sales on this day".
pub const CLOSED_GLYPHS: &[char] = &['-', '－', '‐', '‑', '–', '—', '―', 'ー', '─', '━'];

/// Whole class names, in precedence order: `closed-section` overrides the price class.
pub const CLASS_HINTS: &[(Status, &[&str])] = &[
    (Status::Closed, &["closed-section", "closed"]),
    (Status::NotAvailable, &["sold-out", "soldout", "full", "unavailable", "not-available"]),
    (Status::FewLeft, &["one-left", "few-left", "few"]),
    (Status::Available, &["aval", "available", "vacant"]),
];

pub const GLYPH_TABLE: &[(Status, &[char])] = &[
    (Status::Available, AVAILABLE_GLYPHS),
    (Status::FewLeft, FEW_LEFT_GLYPHS),
    (Status::NotAvailable, NOT_AVAILABLE_GLYPHS),
    (Status::Closed, CLOSED_GLYPHS),
];

// 順序很重要：先看售完/休館，再看剩少量，最後才看有空位，
// "not available" 或 "few remaining" 才不會被當成 available
static KEYWORD_GROUPS: LazyLock<Vec<(Status, Regex)>> = LazyLock::new(|| {
    vec![
        (
            Status::NotAvailable,
            Regex::new(
                r"(?i)(×|✕|✖|満|残り?0(?:[^0-9]|$)|(?:空き|残り|在庫)(?:なし|無し|無)|なし$|no\s*vacan|no\s*seats?|not\s*open|売切|売り切|完売|受付終了|販売終了|予約不可|休|定休|sold|closed|full|unavailable|notavailable|booked)",
            )
            .expect("not_available keyword pattern"),
        ),
        (
            Status::FewLeft,
            Regex::new(r"(?i)(わずか|僅か|僅少|残少|少|few|limited|oneleft|one-left|lastone|almost)")
                .expect("few_left keyword pattern"),
        ),
        (
            Status::Available,
            Regex::new(
                r"(?i)(空き|空あり|空有|予約可|受付中|販売中|購入可|残り|余裕|available|aval|open|vacan|remaining|instock|booknow)",
            )
            .expect("available keyword pattern"),
        ),
    ]
});

/// Pure and total: every input maps to exactly one status.
pub fn classify(mark: &str) -> Status {
    let token = mark.trim();
    let Some(first) = token.chars().next() else {
        return Status::Unknown;
    };

    if let Some(status) = classify_glyph(first) {
        return status;
    }

    if first == '.' {
        return classify_class_hints(token);
    }

    KEYWORD_GROUPS
        .iter()
        .find(|(_, pattern)| pattern.is_match(token))
        .map(|(status, _)| *status)
        .unwrap_or(Status::Unknown)
}

fn classify_glyph(glyph: char) -> Option<Status> {
    GLYPH_TABLE
        .iter()
        .find(|(_, glyphs)| glyphs.contains(&glyph))
        .map(|(status, _)| *status)
}

fn classify_class_hints(token: &str) -> Status {
    let classes: Vec<String> = token
        .split('.')
        .filter(|class| !class.is_empty())
        .map(|class| class.to_ascii_lowercase())
        .collect();

    CLASS_HINTS
        .iter()
        .find(|(_, names)| classes.iter().any(|class| names.contains(&class.as_str())))
        .map(|(status, _)| *status)
        .unwrap_or(Status::Unknown)
}

/// Glyphs listed under more than one status. Must stay empty.
pub fn glyph_conflicts() -> Vec<char> {
    let mut conflicts = Vec::new();
    for (i, (_, glyphs)) in GLYPH_TABLE.iter().enumerate() {
        for glyph in glyphs.iter() {
            let repeated = GLYPH_TABLE[i + 1..]
                .iter()
                .any(|(_, others)| others.contains(glyph));
            if repeated && !conflicts.contains(glyph) {
                conflicts.push(*glyph);
            }
        }
    }
    conflicts
}
