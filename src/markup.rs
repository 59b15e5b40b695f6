//! Regex-driven scanning and editing of rendered HTML markup.
//!
//! This is not an HTML parser. A tag is anything matching `<[^>]*>` and
//! everything between tags is text, the same rule the link rewriter uses to
//! decide what it must not touch. Elements are matched by tag name with a
//! simple open/close stack, which is enough for the generated pages this
//! tool post-processes.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<(/)?([A-Za-z][A-Za-z0-9:-]*)").unwrap());
/// `name`, `name=value`, `name="value"` or `name='value'`.
static RE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

/// Elements that never have content or a close tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// A piece of markup: either a whole tag or the text between tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Tag(&'a str),
    Text(&'a str),
}

impl<'a> Token<'a> {
    pub fn as_str(&self) -> &'a str {
        match *self {
            Token::Tag(s) | Token::Text(s) => s,
        }
    }
}

/// Split markup into tags and text, in document order.
///
/// Concatenating the tokens reproduces the input exactly.
pub fn tokenize(markup: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in RE_TAG.find_iter(markup) {
        if m.start() > last {
            tokens.push(Token::Text(&markup[last..m.start()]));
        }
        tokens.push(Token::Tag(m.as_str()));
        last = m.end();
    }
    if last < markup.len() {
        tokens.push(Token::Text(&markup[last..]));
    }
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
    /// Comments, doctype, processing instructions and anything unparseable.
    Other,
}

#[derive(Debug, Clone)]
struct Attr {
    name: String,
    /// Whole `name="value"` text, relative to the tag start.
    span: Range<usize>,
    value: String,
}

/// A parsed tag: name, kind and attributes.
#[derive(Debug, Clone)]
pub struct TagInfo<'a> {
    raw: &'a str,
    /// Lowercased tag name; empty for [`TagKind::Other`].
    pub name: String,
    pub kind: TagKind,
    attrs: Vec<Attr>,
    name_end: usize,
}

impl<'a> TagInfo<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let other = TagInfo {
            raw,
            name: String::new(),
            kind: TagKind::Other,
            attrs: Vec::new(),
            name_end: 0,
        };
        let Some(caps) = RE_TAG_NAME.captures(raw) else {
            return other;
        };
        let name_end = caps.get(0).map_or(0, |m| m.end());
        let name = caps[2].to_ascii_lowercase();
        if caps.get(1).is_some() {
            return TagInfo {
                name,
                kind: TagKind::Close,
                name_end,
                ..other
            };
        }

        let body_end = raw.strip_suffix('>').map_or(raw.len(), str::len).max(name_end);
        let self_closing = is_self_closing(&raw[..body_end], name_end);
        let attrs = RE_ATTR
            .captures_iter(&raw[name_end..body_end])
            .filter_map(|c| {
                let whole = c.get(0)?;
                let value = c
                    .get(2)
                    .or_else(|| c.get(3))
                    .or_else(|| c.get(4))
                    .map_or("", |m| m.as_str());
                Some(Attr {
                    name: c[1].to_ascii_lowercase(),
                    span: name_end + whole.start()..name_end + whole.end(),
                    value: value.to_string(),
                })
            })
            .collect();

        TagInfo {
            raw,
            name,
            kind: if self_closing {
                TagKind::SelfClosing
            } else {
                TagKind::Open
            },
            attrs,
            name_end,
        }
    }

    /// Value of the named attribute; `Some("")` for a bare attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// True when the element can carry attributes (open or self-closing tag).
    pub fn is_start(&self) -> bool {
        matches!(self.kind, TagKind::Open | TagKind::SelfClosing)
    }

    /// True when this start tag is never followed by content.
    pub fn is_empty_element(&self) -> bool {
        self.kind == TagKind::SelfClosing || VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// Rebuild the tag with the given class list, leaving everything else as written.
    fn with_classes(&self, classes: &[&str]) -> String {
        let existing = self.attrs.iter().find(|a| a.name == "class");
        match (existing, classes.is_empty()) {
            (Some(attr), true) => {
                let start = self.raw[..attr.span.start].trim_end().len();
                format!("{}{}", &self.raw[..start], &self.raw[attr.span.end..])
            }
            (Some(attr), false) => format!(
                "{}class=\"{}\"{}",
                &self.raw[..attr.span.start],
                classes.join(" "),
                &self.raw[attr.span.end..]
            ),
            (None, true) => self.raw.to_string(),
            (None, false) => format!(
                "{} class=\"{}\"{}",
                &self.raw[..self.name_end],
                classes.join(" "),
                &self.raw[self.name_end..]
            ),
        }
    }
}

/// A trailing `/` closes the tag only when it stands apart from an unquoted
/// value: `<br/>`, `<br />` and `<img src="a"/>` do, `<a href=foo/>` does not.
fn is_self_closing(body: &str, name_end: usize) -> bool {
    let Some(before) = body.trim_end().strip_suffix('/') else {
        return false;
    };
    before.len() <= name_end
        || before.ends_with(char::is_whitespace)
        || before.ends_with('"')
        || before.ends_with('\'')
}

/// An element located in markup by its start tag.
#[derive(Debug, Clone)]
pub struct Element<'a> {
    pub tag: TagInfo<'a>,
    /// Byte range of the start tag.
    pub open: Range<usize>,
    /// Byte range of the explicit close tag, if there is one.
    pub close: Option<Range<usize>>,
}

impl Element<'_> {
    /// Byte range covering the element and its content.
    pub fn outer(&self) -> Range<usize> {
        match &self.close {
            Some(close) => self.open.start..close.end,
            None => self.open.clone(),
        }
    }
}

/// Locate every element in document order.
///
/// A close tag closes the innermost open element with the same name; open
/// elements above it on the stack are left without a close tag. Stray
/// close tags are ignored.
pub fn elements(markup: &str) -> Vec<Element<'_>> {
    let mut found: Vec<Element<'_>> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for m in RE_TAG.find_iter(markup) {
        let tag = TagInfo::parse(m.as_str());
        match tag.kind {
            TagKind::Open | TagKind::SelfClosing => {
                let empty = tag.is_empty_element();
                found.push(Element {
                    tag,
                    open: m.range(),
                    close: None,
                });
                if !empty {
                    stack.push(found.len() - 1);
                }
            }
            TagKind::Close => {
                if let Some(pos) = stack.iter().rposition(|&i| found[i].tag.name == tag.name) {
                    found[stack[pos]].close = Some(m.range());
                    stack.truncate(pos);
                }
            }
            TagKind::Other => {}
        }
    }
    found
}

/// Rewrite start tags through `f`; tags for which `f` returns `None` are
/// copied unchanged.
fn map_start_tags(markup: &str, mut f: impl FnMut(&TagInfo<'_>) -> Option<String>) -> String {
    let mut out = String::with_capacity(markup.len());
    for token in tokenize(markup) {
        match token {
            Token::Tag(raw) => {
                let tag = TagInfo::parse(raw);
                match tag.is_start().then(|| f(&tag)).flatten() {
                    Some(rewritten) => out.push_str(&rewritten),
                    None => out.push_str(raw),
                }
            }
            Token::Text(text) => out.push_str(text),
        }
    }
    out
}

/// Remove `class` from every element carrying it.
///
/// A `class` attribute left empty is dropped entirely.
pub fn remove_class(markup: &str, class: &str) -> String {
    map_start_tags(markup, |tag| {
        if !tag.has_class(class) {
            return None;
        }
        let kept: Vec<&str> = tag.classes().filter(|c| *c != class).collect();
        Some(tag.with_classes(&kept))
    })
}

/// Add `class` to every element whose id is `id`.
pub fn add_class_by_id(markup: &str, id: &str, class: &str) -> String {
    map_start_tags(markup, |tag| {
        if tag.attr("id") != Some(id) || tag.has_class(class) {
            return None;
        }
        let mut classes: Vec<&str> = tag.classes().collect();
        classes.push(class);
        Some(tag.with_classes(&classes))
    })
}

/// Insert `fragment` as the last child of every element whose id is `id`.
///
/// Elements without an explicit close tag have nowhere to append to and are
/// skipped.
pub fn append_by_id(markup: &str, id: &str, fragment: &str) -> String {
    let mut positions: Vec<usize> = elements(markup)
        .into_iter()
        .filter(|e| e.tag.attr("id") == Some(id))
        .filter_map(|e| e.close.map(|c| c.start))
        .collect();
    positions.sort_unstable();
    if positions.is_empty() {
        return markup.to_string();
    }

    let mut out = String::with_capacity(markup.len() + fragment.len() * positions.len());
    let mut last = 0;
    for pos in positions {
        out.push_str(&markup[last..pos]);
        out.push_str(fragment);
        last = pos;
    }
    out.push_str(&markup[last..]);
    out
}

/// Remove every element carrying `class`, content included.
///
/// An element with content but no close tag loses only its start tag.
pub fn remove_elements_with_class(markup: &str, class: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut last = 0;
    for element in elements(markup) {
        if !element.tag.has_class(class) {
            continue;
        }
        let range = element.outer();
        // Nested inside an element already removed.
        if range.start < last {
            continue;
        }
        out.push_str(&markup[last..range.start]);
        last = range.end;
    }
    out.push_str(&markup[last..]);
    out
}

/// Remove the tags of every element carrying `class`, keeping its content.
pub fn unwrap_elements_with_class(markup: &str, class: &str) -> String {
    let mut cuts: Vec<Range<usize>> = Vec::new();
    for element in elements(markup) {
        if element.tag.has_class(class) {
            cuts.push(element.open.clone());
            cuts.extend(element.close.clone());
        }
    }
    if cuts.is_empty() {
        return markup.to_string();
    }
    cuts.sort_unstable_by_key(|r| r.start);

    let mut out = String::with_capacity(markup.len());
    let mut last = 0;
    for cut in cuts {
        out.push_str(&markup[last..cut.start]);
        last = cut.end;
    }
    out.push_str(&markup[last..]);
    out
}

/// Byte range of the content of the first `tag` element that has a close tag.
pub fn element_content_range(markup: &str, tag: &str) -> Option<Range<usize>> {
    elements(markup).into_iter().find_map(|e| {
        if !e.tag.name.eq_ignore_ascii_case(tag) {
            return None;
        }
        e.close.map(|close| e.open.end..close.start)
    })
}

/// Escape text for inclusion in element content or a quoted attribute.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
