//! Witness-line highlighting and search-term highlighting.

use crate::markup::{self, escape_text};
use crate::model::Witness;
use crate::rewrite::rewrite_text_occurrences;

/// Class names reserved by the highlighter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Marks a highlighted line element
    pub highlight_class: String,
    /// Marks the inserted `[reason]` annotation
    pub reason_class: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            highlight_class: "highlight".to_string(),
            reason_class: "witness-reason".to_string(),
        }
    }
}

/// Highlight the witness lines, replacing any earlier highlight set.
///
/// An empty witness list leaves the markup exactly as it was, earlier
/// highlights included. Otherwise every existing highlight mark and reason
/// annotation is removed first, then each witness element gets the highlight
/// class and a trailing `<em class="{reason_class}">[reason]</em>`. Ids
/// with no matching element are skipped.
pub fn highlight_lines(
    markup: &str,
    start_line: Option<u32>,
    witnesses: &[Witness],
    config: &HighlightConfig,
) -> String {
    if witnesses.is_empty() {
        return markup.to_string();
    }
    tracing::debug!(
        "highlighting {} witness lines (start line {:?})",
        witnesses.len(),
        start_line
    );

    let cleared = markup::remove_class(markup, &config.highlight_class);
    let mut out = markup::remove_elements_with_class(&cleared, &config.reason_class);

    for witness in witnesses {
        let exists = markup::elements(&out)
            .iter()
            .any(|e| e.tag.attr("id") == Some(witness.id.as_str()));
        if !exists {
            tracing::debug!("no element with id {:?}, skipping", witness.id);
            continue;
        }
        let reason = format!(
            "<em class=\"{}\">[{}]</em>",
            escape_text(&config.reason_class),
            escape_text(&witness.reason)
        );
        let marked = markup::add_class_by_id(&out, &witness.id, &config.highlight_class);
        out = markup::append_by_id(&marked, &witness.id, &reason);
    }
    out
}

/// Wrap text occurrences of `term` in `<strong class="{class}">`, replacing
/// any earlier term highlight with the same class.
pub fn highlight_term(markup: &str, term: &str, case_insensitive: bool, class: &str) -> String {
    let cleared = clear_term_highlights(markup, class);
    let class = escape_text(class);
    rewrite_text_occurrences(&cleared, term, case_insensitive, |found| {
        format!("<strong class=\"{}\">{}</strong>", class, found)
    })
}

/// Undo [`highlight_term`]: unwrap every element carrying `class`.
pub fn clear_term_highlights(markup: &str, class: &str) -> String {
    markup::unwrap_elements_with_class(markup, class)
}
