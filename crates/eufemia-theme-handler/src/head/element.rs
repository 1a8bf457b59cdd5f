//! Head elements as the host renderer hands them to us.

use std::fmt::Write as _;

use html_escape::encode_double_quoted_attribute;

/// Attribute that identifies an inlined stylesheet by its URL.
pub const DATA_HREF: &str = "data-href";

/// Attribute the host uses to pair inlined styles with their chunk.
pub const DATA_IDENTITY: &str = "data-identity";

const VOID_TAGS: &[&str] = &["link", "meta", "base"];

/// One element in a document's `<head>`.
///
/// Attributes keep insertion order so rendered markup is stable between
/// documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadElement {
    tag: String,
    key: Option<String>,
    attrs: Vec<(String, String)>,
    inner_html: Option<String>,
    children: Vec<HeadElement>,
}

impl HeadElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// An inlined stylesheet as emitted by the host for a CSS chunk.
    pub fn inline_style(href: impl Into<String>, css: impl Into<String>) -> Self {
        let href = href.into();
        Self::new("style")
            .with_attr(DATA_HREF, href.clone())
            .with_attr(DATA_IDENTITY, format!("gatsby-global-css:{}", href))
            .with_inner_html(css)
    }

    /// Stable identity used by the host to reconcile elements.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_inner_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = Some(html.into());
        self
    }

    pub fn with_child(mut self, child: HeadElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(n, _)| n == name)?;
        Some(self.attrs.remove(pos).1)
    }

    pub fn inner_html(&self) -> Option<&str> {
        self.inner_html.as_deref()
    }

    pub fn take_inner_html(&mut self) -> Option<String> {
        self.inner_html.take()
    }

    pub fn children(&self) -> &[HeadElement] {
        &self.children
    }

    /// The stylesheet URL this element stands for, if any.
    pub fn data_href(&self) -> Option<&str> {
        self.attr(DATA_HREF)
    }

    /// Serializes the element. Inner HTML is written verbatim.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, encode_double_quoted_attribute(value));
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }

        if let Some(html) = &self.inner_html {
            out.push_str(html);
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Access to a document's head elements, as offered by the host renderer.
pub trait HeadComponents {
    /// Current head elements, in order.
    fn head_components(&self) -> Vec<HeadElement>;

    /// Replaces all head elements.
    fn replace_head_components(&mut self, elements: Vec<HeadElement>);
}

/// A rendered document's head.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHead {
    elements: Vec<HeadElement>,
}

impl DocumentHead {
    pub fn new(elements: Vec<HeadElement>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[HeadElement] {
        &self.elements
    }

    /// Concatenated markup of all elements, one per line.
    pub fn to_html(&self) -> String {
        self.elements
            .iter()
            .map(HeadElement::to_html)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl HeadComponents for DocumentHead {
    fn head_components(&self) -> Vec<HeadElement> {
        self.elements.clone()
    }

    fn replace_head_components(&mut self, elements: Vec<HeadElement>) {
        self.elements = elements;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_element() {
        let link = HeadElement::new("link")
            .with_attr("id", "eufemia-style-theme")
            .with_attr("rel", "stylesheet");
        assert_eq!(link.to_html(), r#"<link id="eufemia-style-theme" rel="stylesheet">"#);
    }

    #[test]
    fn test_nested_and_escaped() {
        let el = HeadElement::new("noscript")
            .with_child(HeadElement::new("link").with_attr("href", "/a.css?x=\"1\"&y"));
        assert_eq!(
            el.to_html(),
            r#"<noscript><link href="/a.css?x=&quot;1&quot;&amp;y"></noscript>"#
        );
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut el = HeadElement::new("link").with_attr("a", "1").with_attr("b", "2");
        el.set_attr("a", "3");
        assert_eq!(el.to_html(), r#"<link a="3" b="2">"#);
        assert_eq!(el.remove_attr("a").as_deref(), Some("3"));
        assert_eq!(el.attr("a"), None);
    }

    #[test]
    fn test_inline_style() {
        let el = HeadElement::inline_style("/ui.123.css", ".a{}");
        assert_eq!(el.data_href(), Some("/ui.123.css"));
        assert_eq!(el.attr(DATA_IDENTITY), Some("gatsby-global-css:/ui.123.css"));
        assert!(el.to_html().ends_with(">.a{}</style>"));
    }

    #[test]
    fn test_document_head_replace() {
        let mut head = DocumentHead::new(vec![HeadElement::new("title")]);
        head.replace_head_components(vec![]);
        assert!(head.elements().is_empty());
    }
}
