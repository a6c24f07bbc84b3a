/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! TNT response parser.
//!
//! Projects a response document onto the views defined in
//! [`crate::message`]. Parsing is namespace-agnostic: elements are matched
//! on their local name only.
//!
//! ## Degradation
//!
//! No entry point returns an error. A document that does not parse yields
//! an empty [`ResponseMeta`], an empty article list, or an empty field
//! catalogue; a malformed level id yields [`tag::DEFAULT_LEVEL`]. Callers
//! treat empty results as "nothing usable extracted".
//!
//! ## Level resolution
//!
//! Levels are resolved in two passes over the `response` subtree:
//!
//! 1. Every `aggregation-level` element is visited in document order and
//!    all of its descendants are recorded in a `NodeId -> level` index.
//!    A nested marker is visited after its ancestor, so its descendants are
//!    overwritten with the innermost level.
//! 2. Every element with direct `name` and `display-name` children becomes
//!    a [`Field`] whose level is looked up in the index.

use crate::convert::{parse_level_id, parse_writable};
use crate::message::{Constraint, Field, ResponseMeta};
use crate::tag;
use roxmltree::{Document, Node, NodeId};
use std::collections::HashMap;

/// Parse `text`, logging and discarding any XML error.
fn parse_document(text: &str) -> Option<Document<'_>> {
    match Document::parse(text.trim()) {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::debug!("[parser] response is not well-formed XML: {}", e);
            None
        }
    }
}

#[inline(always)]
fn is_named(node: &Node, local: &str) -> bool {
    node.is_element() && node.tag_name().name() == local
}

/// First direct element child with the given local name.
fn direct_child<'a, 'input>(node: &Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is_named(c, local))
}

/// Trimmed text of an element; empty when it has none.
fn trimmed_text<'a>(node: &Node<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

/// An element is a field when it has both `name` and `display-name` children.
fn is_field(node: &Node) -> bool {
    direct_child(node, tag::NAME).is_some() && direct_child(node, tag::DISPLAY_NAME).is_some()
}

/// Non-empty attribute value.
fn attribute_value(node: &Node, name: &str) -> Option<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Extract namespace, `version` and `dbVersion` from the root element.
pub fn parse_meta(text: &str) -> ResponseMeta {
    let Some(doc) = parse_document(text) else {
        return ResponseMeta::default();
    };
    let root = doc.root_element();
    ResponseMeta {
        namespace: root
            .tag_name()
            .namespace()
            .filter(|ns| !ns.is_empty())
            .map(str::to_string),
        version: attribute_value(&root, "version"),
        db_version: attribute_value(&root, "dbVersion"),
    }
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

/// Names of all `article` elements with a non-empty direct `name` child.
///
/// Document order; duplicates are kept.
pub fn parse_article_names(text: &str) -> Vec<String> {
    let Some(doc) = parse_document(text) else {
        return Vec::new();
    };
    doc.root_element()
        .descendants()
        .filter(|n| is_named(n, tag::ARTICLE))
        .filter_map(|article| direct_child(&article, tag::NAME))
        .map(|name| trimmed_text(&name))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Pass 1: map every node under an `aggregation-level` to its nearest level.
fn resolve_levels(response: &Node) -> HashMap<NodeId, u32> {
    let mut levels = HashMap::new();
    for agg in response.descendants().filter(|n| is_named(n, tag::AGGREGATION_LEVEL)) {
        let level = agg
            .children()
            .filter(|c| is_named(c, tag::ID))
            .find_map(|id| parse_level_id(trimmed_text(&id)))
            .unwrap_or(tag::DEFAULT_LEVEL);
        for sub in agg.descendants() {
            levels.insert(sub.id(), level);
        }
    }
    levels
}

/// Constraints in `field`'s subtree that are not owned by a nested field.
fn collect_constraints(field: &Node) -> Vec<Constraint> {
    field
        .descendants()
        .skip(1)
        .filter(|n| is_named(n, tag::CONSTRAINT))
        .filter(|c| {
            c.ancestors()
                .skip(1)
                .take_while(|a| a.id() != field.id())
                .all(|a| !is_field(&a))
        })
        .filter_map(|c| read_constraint(&c))
        .collect()
}

fn read_constraint(node: &Node) -> Option<Constraint> {
    let code_text = direct_child(node, tag::CONSTRAINT_TYPE)
        .map(|t| trimmed_text(&t).to_string())
        .or_else(|| attribute_value(node, tag::CONSTRAINT_TYPE))?;
    let Ok(code) = code_text.parse::<u32>() else {
        log::debug!("[parser] dropping constraint with type code {:?}", code_text);
        return None;
    };
    let value = direct_child(node, tag::CONSTRAINT_VALUE)
        .map(|v| trimmed_text(&v).to_string())
        .or_else(|| attribute_value(node, tag::CONSTRAINT_VALUE))
        .unwrap_or_default();
    Some(Constraint { code, value })
}

/// Pass 2 for a single element: build a [`Field`] if it looks like one.
///
/// The preset comes from the first of [`tag::PRESET_ELEMENTS`] present as a
/// direct child, by name priority rather than document order. An empty
/// preset element means no preset.
fn read_field(node: &Node, levels: &HashMap<NodeId, u32>) -> Option<Field> {
    let name = trimmed_text(&direct_child(node, tag::NAME)?).to_string();
    let display = trimmed_text(&direct_child(node, tag::DISPLAY_NAME)?).to_string();

    let writable = direct_child(node, tag::WRITABLE)
        .map(|w| parse_writable(trimmed_text(&w)))
        .unwrap_or(true);

    let preset = tag::PRESET_ELEMENTS
        .iter()
        .find_map(|name| direct_child(node, name))
        .map(|p| trimmed_text(&p))
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    Some(Field {
        level: levels.get(&node.id()).copied().unwrap_or(tag::DEFAULT_LEVEL),
        name,
        display,
        writable,
        preset,
        constraints: collect_constraints(node),
    })
}

/// Extract the field catalogue from the first `response` element.
///
/// Every element with direct `name` and `display-name` children yields one
/// [`Field`], in document order.
pub fn parse_article_fields(text: &str) -> Vec<Field> {
    let Some(doc) = parse_document(text) else {
        return Vec::new();
    };
    let Some(response) = doc
        .root_element()
        .descendants()
        .find(|n| is_named(n, tag::RESPONSE))
    else {
        log::debug!("[parser] no <response> element; no fields extracted");
        return Vec::new();
    };

    let levels = resolve_levels(&response);
    response
        .descendants()
        .filter(|n| n.is_element())
        .filter_map(|n| read_field(&n, &levels))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
