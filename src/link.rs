//! Function-call linking: bare names in code text become links to the page
//! that defines them.

use crate::markup::escape_text;
use crate::model::FunctionLink;
use crate::rewrite::rewrite_text_occurrences;

/// Suffix appended to every link target.
pub const DEFAULT_EXTENSION: &str = ".html";

/// Wrap every text occurrence of `name` in `<a href="{target}{extension}">`.
///
/// Occurrences inside tags are left alone. Text inside an existing anchor is
/// still text, so linking the same name twice nests anchors.
pub fn make_function_link(markup: &str, name: &str, target: &str, extension: &str) -> String {
    let href = escape_text(&format!("{}{}", target, extension));
    rewrite_text_occurrences(markup, name, false, |found| {
        format!("<a href=\"{}\">{}</a>", href, found)
    })
}

/// Link each called function in turn, every pass working on the previous
/// pass's output.
pub fn link_called_functions(markup: &str, functions: &[FunctionLink], extension: &str) -> String {
    functions.iter().fold(markup.to_string(), |acc, f| {
        tracing::debug!("linking {} -> {}{}", f.name, f.target, extension);
        make_function_link(&acc, &f.name, &f.target, extension)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_text_occurrence() {
        assert_eq!(
            make_function_link("<p>foo bar</p>", "foo", "page", DEFAULT_EXTENSION),
            r#"<p><a href="page.html">foo</a> bar</p>"#
        );
    }

    #[test]
    fn attribute_values_untouched() {
        assert_eq!(
            make_function_link(r#"<a href="foo">foo</a>"#, "foo", "page", DEFAULT_EXTENSION),
            r#"<a href="foo"><a href="page.html">foo</a></a>"#
        );
    }

    #[test]
    fn links_every_occurrence() {
        let out = make_function_link("free(p); free(q);", "free", "free", DEFAULT_EXTENSION);
        assert_eq!(
            out,
            r#"<a href="free.html">free</a>(p); <a href="free.html">free</a>(q);"#
        );
    }

    #[test]
    fn metacharacters_are_literal() {
        let out = make_function_link("axb a.b", "a.b", "t", DEFAULT_EXTENSION);
        assert_eq!(out, r#"axb <a href="t.html">a.b</a>"#);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(make_function_link("Foo", "foo", "t", DEFAULT_EXTENSION), "Foo");
    }

    #[test]
    fn relinking_nests_anchors() {
        let once = make_function_link("foo", "foo", "t", DEFAULT_EXTENSION);
        let twice = make_function_link(&once, "foo", "t", DEFAULT_EXTENSION);
        assert_eq!(twice, r#"<a href="t.html"><a href="t.html">foo</a></a>"#);
    }

    #[test]
    fn custom_extension() {
        assert_eq!(
            make_function_link("foo", "foo", "defs/foo", ".htm"),
            r#"<a href="defs/foo.htm">foo</a>"#
        );
    }

    #[test]
    fn empty_name_leaves_markup() {
        assert_eq!(make_function_link("<p>x y</p>", "", "t", DEFAULT_EXTENSION), "<p>x y</p>");
    }

    #[test]
    fn link_called_functions_applies_in_order() {
        let fns = vec![
            FunctionLink::new("archive_read", "archive_read"),
            FunctionLink::new("cleanup", "cleanup"),
        ];
        let out = link_called_functions("archive_read(a); cleanup(a);", &fns, DEFAULT_EXTENSION);
        assert_eq!(
            out,
            r#"<a href="archive_read.html">archive_read</a>(a); <a href="cleanup.html">cleanup</a>(a);"#
        );
    }

    #[test]
    fn later_names_skip_earlier_anchor_attributes() {
        // The second pass sees `read` inside the first anchor's href but must
        // only touch text.
        let fns = vec![
            FunctionLink::new("archive", "read"),
            FunctionLink::new("read", "read_impl"),
        ];
        let out = link_called_functions("archive read", &fns, DEFAULT_EXTENSION);
        assert_eq!(
            out,
            r#"<a href="read.html">archive</a> <a href="read_impl.html">read</a>"#
        );
    }

    #[test]
    fn empty_list_is_a_no_op() {
        assert_eq!(link_called_functions("<p>x</p>", &[], DEFAULT_EXTENSION), "<p>x</p>");
    }
}
