/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! TNT response model.
//!
//! The parser projects a response document onto three independent views:
//! [`ResponseMeta`] (root attributes), a list of article names, and a field
//! catalogue of [`Field`] entries with their [`Constraint`]s. All of them
//! are rebuilt from each response; nothing is merged across responses.

use crate::tag;

/// Protocol metadata from a response root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// Namespace URI of the root element.
    pub namespace: Option<String>,
    /// `version` attribute of the root.
    pub version: Option<String>,
    /// `dbVersion` attribute of the root.
    pub db_version: Option<String>,
}

impl ResponseMeta {
    /// True when nothing could be extracted.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.namespace.is_none() && self.version.is_none() && self.db_version.is_none()
    }
}

/// How a constraint type code is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Regex,
    Interval,
    Gs1Ifa,
    /// A code without an associated validator.
    Other(u32),
}

impl From<u32> for ConstraintKind {
    fn from(code: u32) -> Self {
        match code {
            tag::CONSTRAINT_REGEX => Self::Regex,
            tag::CONSTRAINT_INTERVAL => Self::Interval,
            tag::CONSTRAINT_GS1_IFA => Self::Gs1Ifa,
            other => Self::Other(other),
        }
    }
}

/// A validation constraint declared on a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// Raw type code as sent by the server.
    pub code: u32,
    /// Raw payload; its format depends on the code.
    pub value: String,
}

impl Constraint {
    pub fn new(code: u32, value: &str) -> Self {
        Self {
            code,
            value: value.to_string(),
        }
    }

    #[inline(always)]
    pub fn kind(&self) -> ConstraintKind {
        ConstraintKind::from(self.code)
    }
}

/// One entry of an article's field catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Aggregation level id of the nearest enclosing level marker.
    pub level: u32,
    /// Protocol identifier.
    pub name: String,
    /// Human label.
    pub display: String,
    pub writable: bool,
    /// Server-assigned or default value; such fields are not operator input.
    pub preset: Option<String>,
    pub constraints: Vec<Constraint>,
}

impl Field {
    /// A writable field without preset at [`tag::DEFAULT_LEVEL`].
    pub fn new(name: &str, display: &str) -> Self {
        Self {
            level: tag::DEFAULT_LEVEL,
            name: name.to_string(),
            display: display.to_string(),
            writable: true,
            preset: None,
            constraints: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn with_preset(mut self, preset: &str) -> Self {
        self.preset = Some(preset.to_string());
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// True when the operator has to supply a value: writable and no preset.
    #[inline(always)]
    pub fn needs_input(&self) -> bool {
        self.writable && self.preset.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
