/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Request types and their inner `<request>` fragments.
//!
//! Each builder takes the version to place on the request so the
//! negotiator can rebuild the same request for every candidate version.

use crate::builder::ElementBuilder;
use crate::order::OrderDraft;
use std::fmt;

/// Logical request types driven through version negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    QueryVersion,
    GetArticleList,
    GetArticleFields,
    CreateOrder,
    ImportOrder,
    StartOrder,
}

impl RequestType {
    /// Value of the `xsi:type` attribute.
    pub fn xsi_type(self) -> &'static str {
        match self {
            Self::QueryVersion => "query-version-request",
            Self::GetArticleList => "get-article-list-request",
            Self::GetArticleFields => "get-article-fields-request",
            Self::CreateOrder => "create-order-request",
            Self::ImportOrder => "import-order-request",
            Self::StartOrder => "start-order-request",
        }
    }

    /// Candidate versions, richest first.
    ///
    /// Order creation and import also offer 1.2, which allows creating an
    /// order while another one is running.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::CreateOrder | Self::ImportOrder => &["2.0", "1.2", "1.1", "1.0"],
            Self::QueryVersion
            | Self::GetArticleList
            | Self::GetArticleFields
            | Self::StartOrder => &["2.0", "1.1", "1.0"],
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xsi_type())
    }
}

pub fn query_version(version: &str) -> String {
    ElementBuilder::request(RequestType::QueryVersion.xsi_type(), version).build()
}

pub fn get_article_list(version: &str) -> String {
    ElementBuilder::request(RequestType::GetArticleList.xsi_type(), version).build()
}

pub fn get_article_fields(version: &str, article: &str) -> String {
    ElementBuilder::request(RequestType::GetArticleFields.xsi_type(), version)
        .text("article-name", article)
        .build()
}

/// `create-order-request`: order name, article, order data and optional serials.
pub fn create_order(version: &str, order: &OrderDraft, serials: Option<&str>) -> String {
    ElementBuilder::request(RequestType::CreateOrder.xsi_type(), version)
        .text("order-name", order.order_name())
        .text("article-name", order.article_name())
        .raw(&order.order_data_xml())
        .raw(serials.unwrap_or_default())
        .build()
}

/// `import-order-request`: the same content wrapped in `<order version="2.0">`.
pub fn import_order(version: &str, order: &OrderDraft, serials: Option<&str>) -> String {
    let body = ElementBuilder::new("order")
        .attr("version", "2.0")
        .text("name", order.order_name())
        .text("article-name", order.article_name())
        .raw(&order.order_data_xml())
        .raw(serials.unwrap_or_default())
        .build();
    ElementBuilder::request(RequestType::ImportOrder.xsi_type(), version)
        .raw(&body)
        .build()
}

pub fn start_order(version: &str, order_name: &str) -> String {
    ElementBuilder::request(RequestType::StartOrder.xsi_type(), version)
        .text("order-name", order_name)
        .build()
}

/// True when a manual fragment looks like a `<request>` element.
#[inline(always)]
pub fn is_request_fragment(fragment: &str) -> bool {
    fragment.trim_start().starts_with("<request")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_wrapped(inner: &str) -> String {
        // Declare xsi so the fragment parses on its own.
        format!(
            "<tnt xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">{inner}</tnt>"
        )
    }

    #[test]
    fn test_candidates_richest_first() {
        assert_eq!(RequestType::CreateOrder.candidates(), &["2.0", "1.2", "1.1", "1.0"]);
        assert_eq!(RequestType::StartOrder.candidates(), &["2.0", "1.1", "1.0"]);
        assert_eq!(RequestType::QueryVersion.candidates()[0], "2.0");
    }

    #[test]
    fn test_display_is_xsi_type() {
        assert_eq!(RequestType::ImportOrder.to_string(), "import-order-request");
    }

    #[test]
    fn test_query_version_fragment() {
        assert_eq!(
            query_version("1.1"),
            r#"<request xsi:type="query-version-request" version="1.1" id="1" />"#
        );
    }

    #[test]
    fn test_article_fields_escapes_name() {
        let xml = get_article_fields("1.0", "Bolt & Nut");
        assert!(xml.contains("<article-name>Bolt &amp; Nut</article-name>"));
    }

    #[test]
    fn test_version_attribute_escaped() {
        let xml = get_article_list("1\"0");
        assert!(xml.contains("version=\"1&quot;0\""));
    }

    #[test]
    fn test_create_order_fragment() {
        let mut order = OrderDraft::new("O-1", "Widget-A");
        order.set_value(1, "qty", "7");
        let xml = create_order("1.2", &order, Some("<sns>x</sns>"));
        let doc_text = parse_wrapped(&xml);
        let doc = roxmltree::Document::parse(&doc_text).unwrap();
        let request = doc.root_element().first_element_child().unwrap();
        assert_eq!(request.attribute("version"), Some("1.2"));
        let names: Vec<&str> = request
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name())
            .collect();
        assert_eq!(names, vec!["order-name", "article-name", "order-data", "sns"]);
    }

    #[test]
    fn test_import_order_wraps_order() {
        let order = OrderDraft::new("O-2", "Widget-B");
        let xml = import_order("2.0", &order, None);
        let doc_text = parse_wrapped(&xml);
        let doc = roxmltree::Document::parse(&doc_text).unwrap();
        let request = doc.root_element().first_element_child().unwrap();
        let inner = request.first_element_child().unwrap();
        assert_eq!(inner.tag_name().name(), "order");
        assert_eq!(inner.attribute("version"), Some("2.0"));
        let names: Vec<&str> = inner
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name())
            .collect();
        assert_eq!(names, vec!["name", "article-name", "order-data"]);
    }

    #[test]
    fn test_start_order_fragment() {
        let xml = start_order("1.0", "O-3");
        assert!(xml.starts_with("<request xsi:type=\"start-order-request\" version=\"1.0\""));
        assert!(xml.contains("<order-name>O-3</order-name>"));
    }

    #[test]
    fn test_is_request_fragment() {
        assert!(is_request_fragment("  <request xsi:type=\"x\"/>"));
        assert!(!is_request_fragment("<tnt/>"));
        assert!(!is_request_fragment(""));
    }
}
