use proptest::prelude::*;
use srcmark::markup::elements;
use srcmark::{
    highlight_lines, link_called_functions, make_function_link, FunctionLink, HighlightConfig,
    Witness, DEFAULT_EXTENSION,
};

const LINES: usize = 8;

/// A code block with one `<a id="lN">` element per line.
fn page(lines: &[String]) -> String {
    let mut out = String::from("<pre><code>");
    for (i, line) in lines.iter().enumerate() {
        out.push_str(&format!("<a id=\"l{}\">{}</a>\n", i, line));
    }
    out.push_str("</code></pre>");
    out
}

fn code_line() -> impl Strategy<Value = String> {
    "[a-z_]{1,8}\\([a-z, ]{0,10}\\);"
}

fn witness() -> impl Strategy<Value = Witness> {
    (0..LINES, "[a-z ]{1,12}").prop_map(|(line, reason)| Witness::new(format!("l{}", line), reason))
}

fn highlighted_ids(markup: &str) -> Vec<String> {
    let mut ids: Vec<String> = elements(markup)
        .iter()
        .filter(|e| e.tag.has_class("highlight"))
        .filter_map(|e| e.tag.attr("id").map(str::to_string))
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn highlight_marks_exactly_the_witness_ids(
        lines in prop::collection::vec(code_line(), LINES),
        earlier in prop::collection::vec(witness(), 0..4),
        witnesses in prop::collection::vec(witness(), 1..6),
    ) {
        let config = HighlightConfig::default();
        let before = highlight_lines(&page(&lines), None, &earlier, &config);
        let after = highlight_lines(&before, Some(1), &witnesses, &config);

        let mut expected: Vec<String> = witnesses.iter().map(|w| w.id.clone()).collect();
        expected.sort();
        expected.dedup();
        prop_assert_eq!(highlighted_ids(&after), expected);
        prop_assert_eq!(after.matches("witness-reason").count(), witnesses.len());
    }

    #[test]
    fn highlight_is_idempotent(
        lines in prop::collection::vec(code_line(), LINES),
        witnesses in prop::collection::vec(witness(), 0..6),
    ) {
        let config = HighlightConfig::default();
        let once = highlight_lines(&page(&lines), None, &witnesses, &config);
        let twice = highlight_lines(&once, None, &witnesses, &config);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn empty_highlight_is_a_no_op(
        lines in prop::collection::vec(code_line(), LINES),
        earlier in prop::collection::vec(witness(), 0..4),
    ) {
        let config = HighlightConfig::default();
        let before = highlight_lines(&page(&lines), None, &earlier, &config);
        prop_assert_eq!(highlight_lines(&before, None, &[], &config), before);
    }

    #[test]
    fn linking_never_touches_tags(
        lines in prop::collection::vec(code_line(), LINES),
        name in "[a-z_]{1,6}",
    ) {
        let markup = page(&lines);
        let linked = make_function_link(&markup, &name, "target", DEFAULT_EXTENSION);

        // Dropping the inserted anchors restores the input.
        let restored = linked
            .replace("<a href=\"target.html\">", "")
            .replace("</a>", "");
        prop_assert_eq!(restored, markup.replace("</a>", ""));
    }

    #[test]
    fn metacharacters_match_literally(prefix in "[a-z]{1,4}", suffix in "[a-z]{1,4}", c in "[a-z]") {
        let term = format!("{}.{}", prefix, suffix);
        let lookalike = format!("{}{}{}", prefix, c, suffix);
        prop_assert_eq!(
            make_function_link(&lookalike, &term, "t", DEFAULT_EXTENSION),
            lookalike.clone()
        );
        prop_assert_eq!(
            make_function_link(&term, &term, "t", DEFAULT_EXTENSION),
            format!("<a href=\"t.html\">{}</a>", term)
        );
    }

    #[test]
    fn linking_list_equals_sequential_calls(
        lines in prop::collection::vec(code_line(), LINES),
        names in prop::collection::vec("[a-z_]{1,6}", 0..4),
    ) {
        let markup = page(&lines);
        let functions: Vec<FunctionLink> = names
            .iter()
            .map(|n| FunctionLink::new(n.clone(), format!("{}_def", n)))
            .collect();
        let sequential = functions.iter().fold(markup.clone(), |acc, f| {
            make_function_link(&acc, &f.name, &f.target, DEFAULT_EXTENSION)
        });
        prop_assert_eq!(link_called_functions(&markup, &functions, DEFAULT_EXTENSION), sequential);
    }
}
