//! Page-level entry points: the rewrite extension trait and a configured
//! [`Viewer`] that applies annotations to a whole page.

use crate::highlight::{self, HighlightConfig};
use crate::link::{self, DEFAULT_EXTENSION};
use crate::markup;
use crate::model::{FunctionLink, PageAnnotations, Witness};

/// Rewrite operations callable directly on markup.
pub trait MarkupExt {
    /// Link text occurrences of `name` to `{target}.html`.
    fn make_function_link(&self, name: &str, target: &str) -> String;

    /// Wrap text occurrences of `term` in `<strong class="{class}">`.
    fn highlight_term(&self, term: &str, case_insensitive: bool, class: &str) -> String;
}

impl MarkupExt for str {
    fn make_function_link(&self, name: &str, target: &str) -> String {
        link::make_function_link(self, name, target, DEFAULT_EXTENSION)
    }

    fn highlight_term(&self, term: &str, case_insensitive: bool, class: &str) -> String {
        highlight::highlight_term(self, term, case_insensitive, class)
    }
}

/// Names and suffixes a viewer page uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub highlight: HighlightConfig,
    /// Class for search-term highlights
    pub term_class: String,
    /// Appended to function link targets
    pub extension: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            highlight: HighlightConfig::default(),
            term_class: "search-highlight".to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// A configured annotator for viewer pages.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    config: ViewerConfig,
}

impl Viewer {
    /// One-time setup; every later call uses these names.
    pub fn initialize(config: ViewerConfig) -> Self {
        tracing::debug!(
            "viewer initialized (highlight class {:?}, extension {:?})",
            config.highlight.highlight_class,
            config.extension
        );
        Self { config }
    }

    pub fn highlight_lines(
        &self,
        markup: &str,
        start_line: Option<u32>,
        witnesses: &[Witness],
    ) -> String {
        highlight::highlight_lines(markup, start_line, witnesses, &self.config.highlight)
    }

    pub fn link_called_functions(&self, markup: &str, functions: &[FunctionLink]) -> String {
        link::link_called_functions(markup, functions, &self.config.extension)
    }

    pub fn highlight_term(&self, markup: &str, term: &str, case_insensitive: bool) -> String {
        highlight::highlight_term(markup, term, case_insensitive, &self.config.term_class)
    }

    /// Link called functions, then highlight witness lines.
    ///
    /// Linking is confined to the `<body>` content when the page has one.
    /// It runs first so the inserted reason text is never linked.
    pub fn annotate_page(&self, markup: &str, annotations: &PageAnnotations) -> String {
        let linked = match markup::element_content_range(markup, "body") {
            Some(body) => format!(
                "{}{}{}",
                &markup[..body.start],
                self.link_called_functions(&markup[body.clone()], &annotations.functions),
                &markup[body.end..]
            ),
            None => self.link_called_functions(markup, &annotations.functions),
        };
        self.highlight_lines(&linked, annotations.start_line, &annotations.witnesses)
    }
}
