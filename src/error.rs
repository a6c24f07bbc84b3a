/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Error types.
//!
//! Only I/O-level problems are errors. A read that times out yields whatever
//! arrived, a response that does not parse yields empty results, and a
//! negotiation that never finds an accepted version is reported through
//! [`crate::negotiate::Outcome::Exhausted`].

use crate::config::ConfigError;
use crate::request::RequestType;
use thiserror::Error;

/// Failures of the byte transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The host/port pair did not resolve to any socket address.
    #[error("cannot resolve {0}")]
    Resolve(String),

    /// Opening the TCP connection failed.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the request failed; the connection has been dropped.
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),

    /// Reading the response failed with something other than a timeout.
    #[error("receive failed: {0}")]
    Receive(#[source] std::io::Error),

    /// No connection is open and none could be assumed.
    #[error("not connected")]
    NotConnected,
}

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum TntError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// The negotiator was given nothing to try.
    #[error("no candidate versions for {0}")]
    NoCandidates(RequestType),

    /// The serial-number block could not be compressed.
    #[error("serial block compression failed: {0}")]
    Compression(#[source] std::io::Error),

    /// An order operation was attempted before fields were fetched for an article.
    #[error("no article selected")]
    MissingArticle,

    /// Start-order has neither an entered nor a remembered order name.
    #[error("no order name")]
    MissingOrderName,

    /// A manual fragment must be a `<request ...>` element.
    #[error("manual XML must start with <request")]
    InvalidManualRequest,

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
}
