/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! # TQS-TNT
//!
//! Client core for the TNT XML-over-TCP protocol spoken by TQS LM
//! controllers: version-tagged envelopes, request version negotiation,
//! response parsing into field catalogues, and order assembly.
//!
//! ## Modules
//!
//! - [`tag`]       : Element names, markers and protocol defaults
//! - [`convert`]   : XML escaping and wire-text conversions
//! - [`context`]   : [`ProtocolContext`] negotiated envelope attributes
//! - [`config`]    : [`ClientConfig`] TOML-loadable settings
//! - [`builder`]   : `<request>` element builder and `<tnt>` [`Envelope`]
//! - [`request`]   : [`RequestType`] catalogue and inner request fragments
//! - [`message`]   : Response model: metadata, [`Field`], [`Constraint`]
//! - [`parser`]    : Namespace-agnostic, never-failing response parser
//! - [`validate`]  : [`Validator`] selection from field constraints
//! - [`order`]     : [`OrderDraft`] and the `<order-data>` fragment
//! - [`sns`]       : Compressed serial-number blocks
//! - [`transport`] : [`Transport`] seam and the TCP implementation
//! - [`negotiate`] : [`Negotiator`] version retry loop
//! - [`session`]   : [`TntSession`] orchestrator
//!
//! ## Example
//!
//! ```rust
//! use tqs_tnt::{parser, FieldValues, OrderDraft};
//!
//! let response = r#"<tnt><response>
//!   <aggregation-level><id>1</id>
//!     <field><name>qty</name><display-name>Quantity</display-name></field>
//!     <field><name>color</name><display-name>Color</display-name><preset>red</preset></field>
//!   </aggregation-level>
//! </response></tnt>"#;
//!
//! let fields = parser::parse_article_fields(response);
//! let mut values = FieldValues::new();
//! values.insert(1, "qty", "7");
//!
//! let draft = OrderDraft::from_catalog("Order-1", "Widget-A", &fields, &values);
//! let xml = draft.order_data_xml();
//! assert!(xml.contains("<element><name>qty</name><value>7</value></element>"));
//! assert!(!xml.contains("color"));
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod message;
pub mod negotiate;
pub mod order;
pub mod parser;
pub mod request;
pub mod session;
pub mod sns;
pub mod tag;
pub mod transport;
pub mod validate;

// Re-export the most commonly used types at the crate root.
pub use builder::{ElementBuilder, Envelope};
pub use config::{ClientConfig, ConfigError};
pub use context::ProtocolContext;
pub use error::{TntError, TransportError};
pub use message::{Constraint, ConstraintKind, Field, ResponseMeta};
pub use negotiate::{Negotiated, Negotiator, Outcome};
pub use order::{FieldValues, OrderDraft};
pub use request::RequestType;
pub use session::{Exchange, TntSession};
pub use sns::SerialBlock;
pub use transport::{TcpTransport, Transport};
pub use validate::Validator;

/// TQS-TNT crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
