/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Operator input validation selected from a field's constraints.
//!
//! Exactly one [`Validator`] is chosen per field, in this priority order:
//!
//! 1. the first regex constraint (code 27) with a non-empty pattern that compiles;
//! 2. the first interval constraint (code 25) whose value reads as `(min max)`;
//! 3. any GS1/IFA constraint (code 10): input must be non-empty;
//! 4. otherwise any non-empty input is accepted.

use crate::convert::parse_interval;
use crate::message::{Constraint, ConstraintKind};
use regex::Regex;
use std::fmt;

/// Validation behaviour for one writable field.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Input must match the whole pattern.
    Pattern { pattern: String, regex: Regex },
    /// Input must be an integer in `[min, max]`.
    Interval { min: i64, max: i64 },
    /// GS1/IFA field; input must be non-empty.
    Required,
    /// No usable constraint; input must be non-empty.
    Any,
}

impl Validator {
    /// Select the validator for a constraint list.
    pub fn select(constraints: &[Constraint]) -> Self {
        for c in constraints.iter().filter(|c| c.kind() == ConstraintKind::Regex) {
            if c.value.is_empty() {
                continue;
            }
            match Regex::new(&format!("^(?:{})$", c.value)) {
                Ok(regex) => {
                    return Self::Pattern {
                        pattern: c.value.clone(),
                        regex,
                    }
                }
                Err(e) => log::warn!(
                    "[Validator::select] skipping regex constraint {:?}: {}",
                    c.value,
                    e
                ),
            }
        }

        if let Some((min, max)) = constraints
            .iter()
            .filter(|c| c.kind() == ConstraintKind::Interval)
            .find_map(|c| parse_interval(&c.value))
        {
            return Self::Interval { min, max };
        }

        if constraints.iter().any(|c| c.kind() == ConstraintKind::Gs1Ifa) {
            return Self::Required;
        }

        Self::Any
    }

    /// Check operator input against this validator.
    pub fn validate(&self, input: &str) -> bool {
        match self {
            Self::Pattern { regex, .. } => regex.is_match(input),
            Self::Interval { min, max } => input
                .trim()
                .parse::<i64>()
                .map(|n| (*min..=*max).contains(&n))
                .unwrap_or(false),
            Self::Required | Self::Any => !input.trim().is_empty(),
        }
    }

    /// Short hint shown next to the input.
    pub fn hint(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern { pattern, .. } => write!(f, "regex: {pattern}"),
            Self::Interval { min, max } => write!(f, "int {min}..{max}"),
            Self::Required => write!(f, "required (GS1/IFA)"),
            Self::Any => write!(f, "value"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
