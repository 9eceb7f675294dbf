//! Structural splitting of HTML into tag and text segments.
//!
//! Comments, CDATA sections and `<script>`/`<style>` elements are shielded:
//! each one is emitted whole as a single opaque tag segment, so markup-looking
//! text inside them is never tokenized. Everything else is split on a generic
//! `<...>` pattern.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Elements that never have a closing tag
pub const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Opaque spans, tried in order at every `<`
static SHIELDED: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        // Also covers conditional comments: <!--[if IE]> ... <![endif]-->
        Regex::new(r"^(?s)<!--.*?-->").expect("static regex"),
        Regex::new(r"^(?s)<!\[CDATA\[.*?\]\]>").expect("static regex"),
        Regex::new(r"^(?is)<script\b[^>]*>.*?</script\s*>").expect("static regex"),
        Regex::new(r"^(?is)<style\b[^>]*>.*?</style\s*>").expect("static regex"),
    ]
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]+>").expect("static regex"));

static TAG_AT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<[^<>]+>").expect("static regex"));

static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<\s*(/?)\s*([A-Za-z][A-Za-z0-9:-]*)").expect("static regex"));

/// One piece of a split document.
///
/// `raw` always borrows the exact input bytes; concatenating every `raw` in
/// order gives back the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Tag {
        offset: usize,
        raw: &'a str,
        /// `raw`, with void elements rewritten to self-closing form
        normalized: Cow<'a, str>,
    },
    Text {
        offset: usize,
        raw: &'a str,
    },
}

impl<'a> Segment<'a> {
    /// Byte offset of this segment in the source
    pub fn offset(&self) -> usize {
        match self {
            Segment::Tag { offset, .. } | Segment::Text { offset, .. } => *offset,
        }
    }

    pub fn raw(&self) -> &'a str {
        match self {
            Segment::Tag { raw, .. } | Segment::Text { raw, .. } => *raw,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Segment::Text { .. })
    }

    pub fn end(&self) -> usize {
        self.offset() + self.raw().len()
    }
}

/// Result of [`split`]
#[derive(Debug, Clone, Default)]
pub struct SplitDocument<'a> {
    pub segments: Vec<Segment<'a>>,
    /// Names of elements opened but never closed, outermost first
    pub unclosed: Vec<String>,
}

impl<'a> SplitDocument<'a> {
    /// Rebuild the source text from the raw segments
    pub fn reconstruct(&self) -> String {
        self.segments.iter().map(Segment::raw).collect()
    }

    /// Rebuild with void elements normalized
    pub fn normalized(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Tag { normalized, .. } => normalized.as_ref(),
                Segment::Text { raw, .. } => *raw,
            })
            .collect()
    }

    pub fn tags(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().filter(|s| !s.is_text()).map(Segment::raw)
    }

    pub fn texts(&self) -> impl Iterator<Item = &Segment<'a>> + '_ {
        self.segments.iter().filter(|s| s.is_text())
    }
}

/// Whether `text` contains anything shaped like a tag
pub fn is_html(text: &str) -> bool {
    TAG.is_match(text)
}

/// Kind of tag as far as nesting is concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKind<'a> {
    Open(&'a str),
    Close(&'a str),
    /// Void, self-closing, comment, doctype, processing instruction, or shielded element
    Other,
}

/// Classify a raw tag for open/close tracking
pub fn tag_kind(raw: &str) -> TagKind<'_> {
    let Some((closing, name)) = tag_name(raw) else {
        return TagKind::Other;
    };
    if closing {
        return TagKind::Close(name);
    }
    if is_void(name) || raw.trim_end_matches('>').trim_end().ends_with('/') {
        return TagKind::Other;
    }
    // A shielded element arrives as one segment holding both tags
    if is_raw_text_element(name) && raw.contains("</") {
        return TagKind::Other;
    }
    TagKind::Open(name)
}

/// `script` or `style`, case-insensitive
pub fn is_raw_text_element(name: &str) -> bool {
    name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// Rewrite a void element to self-closing form, leaving everything else alone
pub fn normalize_tag(raw: &str) -> Cow<'_, str> {
    let name = match tag_name(raw) {
        Some((false, name)) if is_void(name) => name,
        _ => return Cow::Borrowed(raw),
    };
    let inner = raw.strip_suffix('>').unwrap_or(raw).trim_end();
    if inner.ends_with('/') {
        return Cow::Borrowed(raw);
    }
    log::trace!("normalizing void element <{}>", name);
    Cow::Owned(format!("{} />", inner))
}

/// `(is_closing, name)` of a tag, `None` for comments, doctypes and the like
fn tag_name(raw: &str) -> Option<(bool, &str)> {
    let caps = TAG_NAME.captures(raw)?;
    let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    Some((closing, caps.get(2)?.as_str()))
}

fn match_tag_at(html: &str, pos: usize) -> Option<usize> {
    let rest = &html[pos..];
    SHIELDED
        .iter()
        .find_map(|re| re.find(rest))
        .or_else(|| TAG_AT.find(rest))
        .map(|m| pos + m.end())
}

/// Split `html` into ordered tag and text segments
pub fn split(html: &str) -> SplitDocument<'_> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(found) = html[pos..].find('<') {
        let at = pos + found;
        match match_tag_at(html, at) {
            Some(end) => {
                if text_start < at {
                    segments.push(Segment::Text {
                        offset: text_start,
                        raw: &html[text_start..at],
                    });
                }
                let raw = &html[at..end];
                segments.push(Segment::Tag {
                    offset: at,
                    raw,
                    normalized: normalize_tag(raw),
                });
                text_start = end;
                pos = end;
            }
            // A lone '<' is ordinary text
            None => pos = at + 1,
        }
    }
    if text_start < html.len() {
        segments.push(Segment::Text {
            offset: text_start,
            raw: &html[text_start..],
        });
    }

    let unclosed = track_unclosed(&segments);
    if !unclosed.is_empty() {
        log::debug!("unclosed tags: {}", unclosed.join(", "));
    }

    SplitDocument { segments, unclosed }
}

/// Best-effort open-tag stack. Closers pop back to the nearest matching
/// opener; closers with no opener are ignored.
fn track_unclosed(segments: &[Segment<'_>]) -> Vec<String> {
    let mut stack: Vec<String> = Vec::new();
    for segment in segments {
        let Segment::Tag { raw, .. } = segment else {
            continue;
        };
        match tag_kind(raw) {
            TagKind::Open(name) => stack.push(name.to_ascii_lowercase()),
            TagKind::Close(name) => {
                if let Some(idx) = stack.iter().rposition(|open| open.eq_ignore_ascii_case(name)) {
                    stack.truncate(idx);
                }
            }
            TagKind::Other => {}
        }
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raws<'a>(doc: &SplitDocument<'a>) -> Vec<&'a str> {
        doc.segments.iter().map(Segment::raw).collect()
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("<p>hi</p>"));
        assert!(is_html("text <br> more"));
        assert!(!is_html("plain text"));
        assert!(!is_html("a < b"));
        assert!(!is_html("<>"));
        assert!(!is_html("a <<>> b"));
    }

    #[test]
    fn test_split_basic() {
        let doc = split("<p>Hello <b>world</b></p>");
        assert_eq!(raws(&doc), vec!["<p>", "Hello ", "<b>", "world", "</b>", "</p>"]);
        assert!(doc.unclosed.is_empty());
        assert_eq!(doc.segments[1].offset(), 3);
    }

    #[test]
    fn test_split_is_lossless() {
        let inputs = [
            "",
            "no tags at all",
            "<div class=\"a\">x < y</div> tail",
            "<!-- <p>not a tag</p> --><p>a b</p>",
            "<script>if (a < b) { x('</p>'); }</script>text",
            "<style>p > a { color: red }</style>",
            "<![CDATA[ <tag> ]]>after",
            "<br><img src=\"x.png\">< lone",
            "<p>unclosed <i>deep",
        ];
        for input in inputs {
            assert_eq!(split(input).reconstruct(), input, "input: {:?}", input);
        }
    }

    #[test]
    fn test_comment_is_opaque() {
        let doc = split("<!-- <p>hidden</p> -->visible");
        assert_eq!(raws(&doc), vec!["<!-- <p>hidden</p> -->", "visible"]);
    }

    #[test]
    fn test_conditional_comment_is_opaque() {
        let html = "<!--[if IE]><p>old</p><![endif]--><p>new</p>";
        let doc = split(html);
        assert_eq!(doc.segments[0].raw(), "<!--[if IE]><p>old</p><![endif]-->");
        assert_eq!(doc.texts().map(|s| s.raw()).collect::<Vec<_>>(), vec!["new"]);
    }

    #[test]
    fn test_script_and_style_are_opaque() {
        let html = "<SCRIPT type=\"text/javascript\">\nvar s = '<p>x y</p>';\n</script ><style>\na < b {}\n</style><p>a b</p>";
        let doc = split(html);
        assert_eq!(
            raws(&doc),
            vec![
                "<SCRIPT type=\"text/javascript\">\nvar s = '<p>x y</p>';\n</script >",
                "<style>\na < b {}\n</style>",
                "<p>",
                "a b",
                "</p>",
            ]
        );
        assert!(doc.unclosed.is_empty());
    }

    #[test]
    fn test_cdata_is_opaque() {
        let doc = split("<x><![CDATA[ a <b> c ]]></x>");
        assert_eq!(raws(&doc), vec!["<x>", "<![CDATA[ a <b> c ]]>", "</x>"]);
    }

    #[test]
    fn test_void_normalization() {
        let doc = split("a<br>b<img src=\"x\" >c<hr/>d<BR>");
        assert_eq!(doc.normalized(), "a<br />b<img src=\"x\" />c<hr/>d<BR />");
        assert_eq!(doc.reconstruct(), "a<br>b<img src=\"x\" >c<hr/>d<BR>");
        // Normalizing twice changes nothing
        assert_eq!(split(&doc.normalized()).normalized(), doc.normalized());
    }

    #[test]
    fn test_non_void_not_normalized() {
        assert_eq!(normalize_tag("<p>"), "<p>");
        assert_eq!(normalize_tag("</br>"), "</br>");
        assert!(matches!(normalize_tag("<br/>"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unclosed_tracking() {
        let doc = split("<div><p>one<i>two</div><span>");
        assert_eq!(doc.unclosed, vec!["span".to_string()]);

        let doc = split("</em><ul><li>item");
        assert_eq!(doc.unclosed, vec!["ul".to_string(), "li".to_string()]);
    }

    #[test]
    fn test_tag_kind() {
        assert_eq!(tag_kind("<p class=\"x\">"), TagKind::Open("p"));
        assert_eq!(tag_kind("</ P>"), TagKind::Close("P"));
        assert_eq!(tag_kind("<br>"), TagKind::Other);
        assert_eq!(tag_kind("<my-widget/>"), TagKind::Other);
        assert_eq!(tag_kind("<!DOCTYPE html>"), TagKind::Other);
        assert_eq!(tag_kind("<script>"), TagKind::Open("script"));
        assert_eq!(tag_kind("<script>x()</script>"), TagKind::Other);
    }

    #[test]
    fn test_unclosed_script_not_shielded() {
        let doc = split("<script>var a = 1; <p>x y</p>");
        assert_eq!(doc.segments[0].raw(), "<script>");
        assert_eq!(doc.unclosed, vec!["script".to_string()]);
    }
}
