/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Negotiated protocol state shared by every envelope.
//!
//! A [`ProtocolContext`] is owned by the session and passed by reference to
//! the envelope builder. It changes only when a `query-version` exchange
//! succeeds ([`ProtocolContext::apply_meta`]) or when the operator overrides
//! a value through the setters.

use crate::message::ResponseMeta;
use crate::tag;

/// Envelope attributes negotiated with (or configured for) the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolContext {
    namespace: String,
    interface_version: String,
    db_version: Option<String>,
    agent: String,
}

impl Default for ProtocolContext {
    fn default() -> Self {
        Self {
            namespace: tag::DEFAULT_NAMESPACE.to_string(),
            interface_version: tag::DEFAULT_INTERFACE_VERSION.to_string(),
            db_version: None,
            agent: tag::DEFAULT_AGENT.to_string(),
        }
    }
}

impl ProtocolContext {
    pub fn new(namespace: &str, interface_version: &str, db_version: Option<&str>, agent: &str) -> Self {
        let mut ctx = Self::default();
        ctx.set_namespace(namespace);
        ctx.set_interface_version(interface_version);
        ctx.set_db_version(db_version);
        ctx.set_agent(agent);
        ctx
    }

    #[inline(always)]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Interface version placed on the envelope root. Never empty.
    #[inline(always)]
    pub fn interface_version(&self) -> &str {
        &self.interface_version
    }

    #[inline(always)]
    pub fn db_version(&self) -> Option<&str> {
        self.db_version.as_deref()
    }

    #[inline(always)]
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Override the namespace; blank input restores the default.
    pub fn set_namespace(&mut self, namespace: &str) {
        self.namespace = non_blank_or(namespace, tag::DEFAULT_NAMESPACE);
    }

    /// Override the interface version; blank input restores the default.
    pub fn set_interface_version(&mut self, version: &str) {
        self.interface_version = non_blank_or(version, tag::DEFAULT_INTERFACE_VERSION);
    }

    /// Override the database version; blank input clears it.
    pub fn set_db_version(&mut self, db_version: Option<&str>) {
        self.db_version = db_version
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
    }

    /// Override the agent; blank input restores the default.
    pub fn set_agent(&mut self, agent: &str) {
        self.agent = non_blank_or(agent, tag::DEFAULT_AGENT);
    }

    /// Adopt the values a `query-version` response reported.
    ///
    /// Absent values leave the current setting untouched.
    pub fn apply_meta(&mut self, meta: &ResponseMeta) {
        if let Some(ns) = meta.namespace.as_deref() {
            self.set_namespace(ns);
        }
        if let Some(v) = meta.version.as_deref() {
            self.set_interface_version(v);
        }
        if meta.db_version.is_some() {
            self.set_db_version(meta.db_version.as_deref());
        }
        log::info!(
            "[ProtocolContext::apply_meta] namespace={} version={} dbVersion={:?}",
            self.namespace,
            self.interface_version,
            self.db_version
        );
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    let v = value.trim();
    if v.is_empty() {
        fallback.to_string()
    } else {
        v.to_string()
    }
}
