/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Order drafts and the `<order-data>` fragment.
//!
//! An [`OrderDraft`] groups operator-entered `(name, value)` pairs by
//! aggregation level. [`OrderDraft::order_data_xml`] renders one
//! `<aggregation-level>` block per known level, ascending, including levels
//! where nothing was filled in. A draft without any level renders a single
//! placeholder level `0` so the fragment is always structurally complete.

use crate::convert::xml_escape;
use crate::error::TntError;
use crate::message::Field;
use crate::sns::SerialBlock;
use crate::tag;
use std::collections::{BTreeMap, HashMap};

/// Operator-entered values keyed by `(level, field name)`.
#[derive(Debug, Clone, Default)]
pub struct FieldValues {
    values: HashMap<(u32, String), String>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value; returns `&mut self` for chaining.
    pub fn insert(&mut self, level: u32, name: &str, value: &str) -> &mut Self {
        self.values.insert((level, name.to_string()), value.to_string());
        self
    }

    pub fn get(&self, level: u32, name: &str) -> Option<&str> {
        self.values
            .get(&(level, name.to_string()))
            .map(String::as_str)
    }
}

/// An order about to be created or imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    order_name: String,
    article_name: String,
    include_serials: bool,
    /// Filled pairs per level; a level with an empty list is still emitted.
    levels: BTreeMap<u32, Vec<(String, String)>>,
}

impl OrderDraft {
    /// New draft with serial numbers enabled.
    ///
    /// A blank order name becomes [`tag::DEFAULT_ORDER_NAME`].
    pub fn new(order_name: &str, article_name: &str) -> Self {
        let name = order_name.trim();
        Self {
            order_name: if name.is_empty() {
                tag::DEFAULT_ORDER_NAME.to_string()
            } else {
                name.to_string()
            },
            article_name: article_name.to_string(),
            include_serials: true,
            levels: BTreeMap::new(),
        }
    }

    /// Build a draft from a field catalogue and the operator's values.
    ///
    /// Only fields that need input (writable, no preset) take part: each one
    /// declares its level, and a non-blank value is recorded in catalogue order.
    pub fn from_catalog(
        order_name: &str,
        article_name: &str,
        fields: &[Field],
        values: &FieldValues,
    ) -> Self {
        let mut draft = Self::new(order_name, article_name);
        for field in fields.iter().filter(|f| f.needs_input()) {
            draft.declare_level(field.level);
            if let Some(value) = values.get(field.level, &field.name) {
                draft.set_value(field.level, &field.name, value);
            }
        }
        draft
    }

    pub fn with_serials(mut self, include: bool) -> Self {
        self.include_serials = include;
        self
    }

    #[inline(always)]
    pub fn order_name(&self) -> &str {
        &self.order_name
    }

    #[inline(always)]
    pub fn article_name(&self) -> &str {
        &self.article_name
    }

    #[inline(always)]
    pub fn include_serials(&self) -> bool {
        self.include_serials
    }

    /// Make sure `level` is emitted even if nothing is filled in.
    pub fn declare_level(&mut self, level: u32) -> &mut Self {
        self.levels.entry(level).or_default();
        self
    }

    /// Record a filled value. Blank values only declare the level.
    pub fn set_value(&mut self, level: u32, name: &str, value: &str) -> &mut Self {
        let entry = self.levels.entry(level).or_default();
        let value = value.trim();
        if !value.is_empty() {
            entry.push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Filled pairs for one level, in fill order.
    pub fn values(&self, level: u32) -> &[(String, String)] {
        self.levels.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Emitted levels, ascending; `[0]` when none were declared.
    pub fn levels(&self) -> Vec<u32> {
        if self.levels.is_empty() {
            vec![tag::PLACEHOLDER_LEVEL]
        } else {
            self.levels.keys().copied().collect()
        }
    }

    /// Render the `<order-data>` fragment.
    pub fn order_data_xml(&self) -> String {
        let mut out = String::from("<order-data>");
        for level in self.levels() {
            out.push_str(&format!(
                "<aggregation-level><id>{level}</id><data-field-values>"
            ));
            for (name, value) in self.values(level) {
                out.push_str(&format!(
                    "<element><name>{}</name><value>{}</value></element>",
                    xml_escape(name),
                    xml_escape(value)
                ));
            }
            out.push_str("</data-field-values></aggregation-level>");
        }
        out.push_str("</order-data>");
        out
    }

    /// Level that receives the serial-number block: the first level above
    /// zero, else `0`.
    pub fn serial_level(&self) -> u32 {
        self.levels()
            .into_iter()
            .find(|&l| l > 0)
            .unwrap_or(tag::PLACEHOLDER_LEVEL)
    }

    /// The `<sns>` element for this draft, or `None` when serials are off.
    pub fn serial_xml(&self) -> Result<Option<String>, TntError> {
        if !self.include_serials {
            return Ok(None);
        }
        let block = SerialBlock::for_level(self.serial_level())?;
        Ok(Some(block.to_xml()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
