/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! TNT protocol element names, markers, and well-known constants.
//!
//! Element names are local names: every lookup in [`crate::parser`] strips
//! the namespace before comparing, so these constants never carry a prefix.

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Root element of every request and response document.
pub const TNT: &str = "tnt";

/// Header block carrying the agent and timestamp.
pub const HEADER: &str = "header";

/// Client identification inside the header.
pub const AGENT: &str = "agent";

/// ISO-8601 send time inside the header.
pub const TIMESTAMP: &str = "timestamp";

/// Inner request element; carries `xsi:type` and `version` attributes.
pub const REQUEST: &str = "request";

/// Inner response element returned by the server.
pub const RESPONSE: &str = "response";

/// XML Schema instance namespace, bound to the `xsi` prefix.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

// ---------------------------------------------------------------------------
// Response markers
// ---------------------------------------------------------------------------

/// Substring signalling that the server rejected the request version.
pub const VERSION_ERROR_MARKER: &str = "version-error";

/// Element naming the version the server wants after a version error.
pub const CONCERNING: &str = "concerning";

/// Literal success marker for order operations.
pub const SUCCESS_MARKER: &str = "<return-value>ok</return-value>";

/// Closing root tag; the transport stops reading once it has arrived.
pub const END_OF_MESSAGE: &[u8] = b"</tnt>";

// ---------------------------------------------------------------------------
// Catalogue elements
// ---------------------------------------------------------------------------

/// An article entry in a `get-article-list` response.
pub const ARTICLE: &str = "article";

/// Protocol identifier of an article or field.
pub const NAME: &str = "name";

/// Human label of a field.
pub const DISPLAY_NAME: &str = "display-name";

/// Optional writable flag of a field.
pub const WRITABLE: &str = "writable";

/// Elements carrying a preset value, checked in this order.
pub const PRESET_ELEMENTS: [&str; 3] = ["value-set-by-article", "preset", "default-value"];

/// Grouping element for fields of one aggregation level.
pub const AGGREGATION_LEVEL: &str = "aggregation-level";

/// Numeric id child of an aggregation level.
pub const ID: &str = "id";

/// Validation constraint attached to a field.
pub const CONSTRAINT: &str = "constraint";

/// Constraint type code child (or attribute).
pub const CONSTRAINT_TYPE: &str = "type";

/// Constraint payload child (or attribute).
pub const CONSTRAINT_VALUE: &str = "value";

// ---------------------------------------------------------------------------
// Constraint type codes
// ---------------------------------------------------------------------------

/// Code 27: regular expression the input must match.
pub const CONSTRAINT_REGEX: u32 = 27;

/// Code 25: closed integer interval written as `(min max)`.
pub const CONSTRAINT_INTERVAL: u32 = 25;

/// Code 10: GS1/IFA field; input is required to be non-empty.
pub const CONSTRAINT_GS1_IFA: u32 = 10;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Namespace used until the server reports its own.
pub const DEFAULT_NAMESPACE: &str = "http://www.wipotec.com";

/// Interface version used until a `query-version` exchange succeeds.
pub const DEFAULT_INTERFACE_VERSION: &str = "1.15";

/// Agent string sent in every header.
pub const DEFAULT_AGENT: &str = "MW";

/// TCP port of the TNT service.
pub const DEFAULT_PORT: u16 = 7973;

/// Order name used when the operator leaves it empty.
pub const DEFAULT_ORDER_NAME: &str = "TestOrder001";

/// Aggregation level assumed for fields outside any level marker.
pub const DEFAULT_LEVEL: u32 = 1;

/// Level emitted when an order has no levels at all.
pub const PLACEHOLDER_LEVEL: u32 = 0;

/// Number of serial numbers generated per block.
pub const SERIAL_COUNT: usize = 10;
