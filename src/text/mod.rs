//! Text normalization applied to everything before it reaches the model.
//!
//! The steps and their order are fixed: lowercase, collapse non-word runs
//! to a space, drop stray single letters, collapse whitespace, cap length,
//! trim. The output is idempotent under re-normalization.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::DEFAULT_MAX_TEXT_CHARS;

static NON_WORD_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// Text that went through [`normalize`]. Lowercase, single-spaced, trimmed,
/// and at most the configured number of characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize with the default 2500 character cap.
pub fn normalize(text: &str) -> NormalizedText {
    normalize_with_limit(text, DEFAULT_MAX_TEXT_CHARS)
}

pub fn normalize_with_limit(text: &str, max_chars: usize) -> NormalizedText {
    let lowered = text.to_lowercase();
    let spaced = NON_WORD_RUN.replace_all(&lowered, " ");
    let collapsed = drop_single_letters(&spaced);
    let capped = truncate_chars(&collapsed, max_chars);
    NormalizedText(capped.trim().to_string())
}

/// Removes every single alphabetic token that has whitespace on both sides
/// and joins the survivors with single spaces.
///
/// `spaced` only contains word characters and single spaces at this point.
/// Removal runs to a fixpoint: in `"x a b y"` both `a` and `b` go, which a
/// single non-overlapping regex pass would not do.
fn drop_single_letters(spaced: &str) -> String {
    let leading = spaced.starts_with(' ');
    let trailing = spaced.ends_with(' ');
    let tokens: Vec<&str> = spaced.split(' ').filter(|t| !t.is_empty()).collect();
    let last = tokens.len().saturating_sub(1);

    let kept: Vec<&str> = tokens
        .iter()
        .enumerate()
        .filter(|(i, token)| {
            let surrounded = (*i > 0 || leading) && (*i < last || trailing);
            !(surrounded && is_single_letter(token))
        })
        .map(|(_, token)| *token)
        .collect();

    kept.join(" ")
}

fn is_single_letter(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
