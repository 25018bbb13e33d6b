//! Heuristic article text extraction.
//!
//! Three stages are tried in order: article body containers, then titles,
//! then meta descriptions. Within a stage the first selector producing
//! non-empty text wins; no attempt is made to pick the "best" match.

pub mod selectors;

#[cfg(test)]
mod tests;

use scraper::{ElementRef, Html, Node};
use tracing::debug;

use selectors::{Candidate, Extract, NOISE_TAGS};

/// Which stage produced the extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Content,
    Title,
    Description,
}

/// Best-effort article text. Empty when every stage came up blank.
pub fn extract_content(html: &str) -> String {
    extract_with_stage(html)
        .map(|(_, text)| text)
        .unwrap_or_default()
}

/// Same as [`extract_content`] but reports the stage that matched.
pub fn extract_with_stage(html: &str) -> Option<(Stage, String)> {
    let document = Html::parse_document(html);

    let stages: [(Stage, &[Candidate]); 3] = [
        (Stage::Content, selectors::CONTENT.as_slice()),
        (Stage::Title, selectors::TITLE.as_slice()),
        (Stage::Description, selectors::DESCRIPTION.as_slice()),
    ];

    for (stage, candidates) in stages {
        if let Some((source, text)) = first_match(&document, candidates) {
            debug!(?stage, selector = source, chars = text.chars().count(), "extracted");
            return Some((stage, text));
        }
    }

    None
}

fn first_match(document: &Html, candidates: &[Candidate]) -> Option<(&'static str, String)> {
    candidates.iter().find_map(|candidate| {
        let mut combined = String::new();
        for element in document.select(&candidate.selector) {
            match candidate.extract {
                Extract::Text => collect_text(element, &mut combined),
                Extract::Attr(name) => {
                    if let Some(value) = element.value().attr(name) {
                        combined.push_str(value);
                    }
                }
            }
        }

        let trimmed = combined.trim();
        (!trimmed.is_empty()).then(|| (candidate.source, trimmed.to_string()))
    })
}

/// Appends the text below `element`, skipping noise elements among its descendants.
///
/// Walks with an explicit stack; page nesting depth is attacker controlled.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    let mut pending: Vec<_> = element.children().rev().collect();

    while let Some(node) = pending.pop() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) if !NOISE_TAGS.contains(&inner.name()) => {
                pending.extend(node.children().rev());
            }
            _ => {}
        }
    }
}
