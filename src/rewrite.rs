//! Single-pass rewriting of a literal term in the text content of markup.
//!
//! The scan uses one alternation, `(<[^>]*>)|(\b<term>)`, applied globally.
//! Whole tags are consumed by the first branch and copied through, so tag
//! names and attribute values are never rewritten; only the second branch
//! reaches the callback.

use regex::{Captures, Regex, RegexBuilder};

/// Build the tag-or-term pattern for `term`, matched literally.
///
/// Returns `None` for an empty term, which would otherwise match the empty
/// string at every word boundary.
pub fn term_pattern(term: &str, case_insensitive: bool) -> Option<Regex> {
    if term.is_empty() {
        return None;
    }
    // ASCII word boundary: a non-ASCII letter before the term does not block it.
    let pattern = format!(r"(<[^>]*>)|((?-u:\b){})", regex::escape(term));
    match RegexBuilder::new(&pattern)
        .case_insensitive(case_insensitive)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("cannot build pattern for {:?}: {}", term, e);
            None
        }
    }
}

/// Replace every text occurrence of `term` with `wrap(occurrence)`.
///
/// The boundary is only checked before the term, so `free` also matches the
/// start of `freelist`. Markup is returned unchanged for an empty term.
pub fn rewrite_text_occurrences(
    markup: &str,
    term: &str,
    case_insensitive: bool,
    mut wrap: impl FnMut(&str) -> String,
) -> String {
    let Some(re) = term_pattern(term, case_insensitive) else {
        tracing::debug!("empty search term, markup left unchanged");
        return markup.to_string();
    };
    re.replace_all(markup, |caps: &Captures<'_>| match caps.get(2) {
        Some(m) => wrap(m.as_str()),
        None => caps[0].to_string(),
    })
    .into_owned()
}
