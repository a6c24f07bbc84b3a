/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! TNT request serializers.
//!
//! [`ElementBuilder`] accumulates attributes and children of one XML element
//! and renders it with two-space indentation. [`Envelope`] wraps a finished
//! `<request>` fragment in the outer `<tnt>` document.
//!
//! ## Escaping
//!
//! Attribute values and text children are escaped with
//! [`crate::convert::xml_escape`]. Raw children and the envelope's inner
//! fragment are inserted verbatim, since they are pre-built XML.
//!
//! ## Envelope layout
//!
//! ```text
//! <tnt version=".." [dbVersion=".."] xmlns=".." xmlns:xsi="..">
//!   <header><agent>..</agent><timestamp>..</timestamp></header>
//!   <request xsi:type=".." version="..">..</request>
//! </tnt>
//! ```

use crate::context::ProtocolContext;
use crate::convert::xml_escape;
use crate::tag;
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

enum Child {
    Text(String, String),
    Raw(String),
}

/// Serializer for one XML element.
///
/// Attributes and children are emitted in the order they were added.
pub struct ElementBuilder {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Child>,
}

impl ElementBuilder {
    #[inline(always)]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Start a `<request xsi:type=".." version=".." id="1">` element.
    pub fn request(xsi_type: &str, version: &str) -> Self {
        let mut b = Self::new(tag::REQUEST);
        b.attr("xsi:type", xsi_type).attr("version", version).attr("id", "1");
        b
    }

    /// Append an attribute; the value is escaped.
    #[inline(always)]
    pub fn attr(&mut self, name: &str, value: &str) -> &mut Self {
        self.attrs.push((name.to_string(), xml_escape(value)));
        self
    }

    /// Append a `<name>text</name>` child; the text is escaped.
    #[inline(always)]
    pub fn text(&mut self, name: &str, value: &str) -> &mut Self {
        self.children
            .push(Child::Text(name.to_string(), xml_escape(value)));
        self
    }

    /// Append a pre-built fragment verbatim. Empty fragments are skipped.
    #[inline(always)]
    pub fn raw(&mut self, fragment: &str) -> &mut Self {
        if !fragment.trim().is_empty() {
            self.children.push(Child::Raw(fragment.to_string()));
        }
        self
    }

    /// Render the element. Without children it is self-closing.
    pub fn build(&self) -> String {
        let mut out = String::new();
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attrs {
            out.push_str(&format!(" {k}=\"{v}\""));
        }
        if self.children.is_empty() {
            out.push_str(" />");
            return out;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Child::Text(name, value) => {
                    out.push_str(&format!("\n  <{name}>{value}</{name}>"));
                }
                Child::Raw(fragment) => {
                    for line in fragment.lines() {
                        out.push_str("\n  ");
                        out.push_str(line);
                    }
                }
            }
        }
        out.push_str(&format!("\n</{}>", self.name));
        out
    }
}

/// An inner request fragment awaiting its envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    inner: String,
}

impl Envelope {
    #[inline(always)]
    pub fn new(inner: &str) -> Self {
        Self {
            inner: inner.to_string(),
        }
    }

    /// Wrap the fragment using the current local time.
    pub fn build(&self, ctx: &ProtocolContext) -> String {
        self.build_at(ctx, DateTime::<FixedOffset>::from(Local::now()))
    }

    /// Wrap the fragment with an explicit timestamp.
    pub fn build_at(&self, ctx: &ProtocolContext, timestamp: DateTime<FixedOffset>) -> String {
        let db_attr = ctx
            .db_version()
            .map(|db| format!(" dbVersion=\"{}\"", xml_escape(db)))
            .unwrap_or_default();
        format!(
            "<{root} version=\"{version}\"{db_attr} xmlns=\"{ns}\" xmlns:xsi=\"{xsi}\">\
             <{header}><{agent}>{agent_value}</{agent}><{ts}>{ts_value}</{ts}></{header}>\
             {inner}</{root}>",
            root = tag::TNT,
            version = xml_escape(ctx.interface_version()),
            ns = xml_escape(ctx.namespace()),
            xsi = tag::XSI_NAMESPACE,
            header = tag::HEADER,
            agent = tag::AGENT,
            agent_value = xml_escape(ctx.agent()),
            ts = tag::TIMESTAMP,
            ts_value = iso_timestamp(&timestamp),
            inner = self.inner,
        )
    }
}

/// ISO-8601 with offset and second precision, e.g. `2026-01-01T12:00:00+01:00`.
#[inline(always)]
pub fn iso_timestamp(t: &DateTime<FixedOffset>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-03-01T08:30:15+01:00").unwrap()
    }

    #[test]
    fn test_request_without_children_is_self_closing() {
        let xml = ElementBuilder::request("query-version-request", "1.0").build();
        assert_eq!(
            xml,
            r#"<request xsi:type="query-version-request" version="1.0" id="1" />"#
        );
    }

    #[test]
    fn test_children_in_insertion_order() {
        let xml = ElementBuilder::request("start-order-request", "2.0")
            .text("order-name", "A&B")
            .raw("<x/>")
            .build();
        assert_eq!(
            xml,
            "<request xsi:type=\"start-order-request\" version=\"2.0\" id=\"1\">\n  \
             <order-name>A&amp;B</order-name>\n  <x/>\n</request>"
        );
    }

    #[test]
    fn test_raw_fragment_is_indented_per_line() {
        let xml = ElementBuilder::new("order").raw("<a>\n  <b/>\n</a>").build();
        assert_eq!(xml, "<order>\n  <a>\n    <b/>\n  </a>\n</order>");
    }

    #[test]
    fn test_empty_raw_skipped() {
        let xml = ElementBuilder::new("order").raw("  ").build();
        assert_eq!(xml, "<order />");
    }

    #[test]
    fn test_envelope_layout() {
        let ctx = ProtocolContext::new("http://www.wipotec.com", "1.15", None, "MW");
        let inner = ElementBuilder::request("query-version-request", "1.0").build();
        let xml = Envelope::new(&inner).build_at(&ctx, fixed_time());
        assert_eq!(
            xml,
            "<tnt version=\"1.15\" xmlns=\"http://www.wipotec.com\" \
             xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
             <header><agent>MW</agent><timestamp>2026-03-01T08:30:15+01:00</timestamp></header>\
             <request xsi:type=\"query-version-request\" version=\"1.0\" id=\"1\" /></tnt>"
        );
    }

    #[test]
    fn test_db_version_only_when_set() {
        let mut ctx = ProtocolContext::default();
        let inner = "<request/>";
        assert!(!Envelope::new(inner).build_at(&ctx, fixed_time()).contains("dbVersion"));
        ctx.set_db_version(Some("33"));
        assert!(Envelope::new(inner)
            .build_at(&ctx, fixed_time())
            .contains(" dbVersion=\"33\""));
    }

    #[test]
    fn test_envelope_is_well_formed() {
        let ctx = ProtocolContext::new("urn:tqs", "2.0", Some("5"), "line-1");
        let inner = ElementBuilder::request("get-article-fields-request", "1.0")
            .text("article-name", "Widget <A>")
            .build();
        let xml = Envelope::new(&inner).build_at(&ctx, fixed_time());
        let doc = roxmltree::Document::parse(&xml).expect("envelope must parse");
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "tnt");
        assert_eq!(root.tag_name().namespace(), Some("urn:tqs"));
        assert_eq!(root.attribute("version"), Some("2.0"));
        assert_eq!(root.attribute("dbVersion"), Some("5"));
        let article = root
            .descendants()
            .find(|n| n.tag_name().name() == "article-name")
            .unwrap();
        assert_eq!(article.text(), Some("Widget <A>"));
    }

    #[test]
    fn test_operator_input_is_escaped() {
        let ctx = ProtocolContext::new("urn:a\"b", "1.0\"<", Some("x&y"), "<agent>&\"");
        let xml = Envelope::new("<request/>").build_at(&ctx, fixed_time());
        assert!(xml.contains("xmlns=\"urn:a&quot;b\""));
        assert!(xml.contains("version=\"1.0&quot;&lt;\""));
        assert!(xml.contains("dbVersion=\"x&amp;y\""));
        assert!(xml.contains("<agent>&lt;agent&gt;&amp;&quot;</agent>"));

        let doc = roxmltree::Document::parse(&xml).expect("escaped envelope must parse");
        let root = doc.root_element();
        assert_eq!(root.attribute("version"), Some("1.0\"<"));
        let agent = root
            .descendants()
            .find(|n| n.tag_name().name() == "agent")
            .unwrap();
        assert_eq!(agent.text(), Some("<agent>&\""));
    }

    #[test]
    fn test_live_timestamp_has_offset_and_seconds() {
        let xml = Envelope::new("<request/>").build(&ProtocolContext::default());
        let start = xml.find("<timestamp>").unwrap() + "<timestamp>".len();
        let end = xml.find("</timestamp>").unwrap();
        let ts = &xml[start..end];
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
        assert!(!ts.contains('.'));
    }
}
