/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! TNT session orchestrator.
//!
//! [`TntSession`] owns the [`ProtocolContext`], the transport and the state
//! carried between operator actions (article list, field catalogue, last
//! created order). Each operation runs synchronously:
//!
//! ```text
//! build request → negotiate (envelope + transport) → parse → update model
//! ```
//!
//! Typical sequence:
//!
//! ```text
//! query_version → fetch_articles → fetch_fields(article)
//!     → draft_order(values) → create_order / import_order → start_order
//! ```

use crate::builder::Envelope;
use crate::config::ClientConfig;
use crate::context::ProtocolContext;
use crate::convert::is_success;
use crate::error::TntError;
use crate::message::Field;
use crate::negotiate::{Negotiated, Negotiator};
use crate::order::{FieldValues, OrderDraft};
use crate::parser::{parse_article_fields, parse_article_names, parse_meta};
use crate::request::{self, RequestType};
use crate::transport::{TcpTransport, Transport};
use crate::validate::Validator;
use std::collections::BTreeMap;
use std::time::Duration;

/// The last request document sent and the response text received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub request: String,
    /// Empty when the transport failed before anything arrived.
    pub response: String,
}

/// Session state for one controller.
pub struct TntSession<T: Transport> {
    context: ProtocolContext,
    transport: T,
    negotiator: Negotiator,
    timeout: Duration,
    last_exchange: Option<Exchange>,
    articles: Vec<String>,
    current_article: Option<String>,
    fields: Vec<Field>,
    last_order: Option<String>,
}

impl TntSession<TcpTransport> {
    /// Session over TCP using the configured endpoint and protocol defaults.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TntError> {
        config.validate()?;
        Ok(Self::new(config.transport(), config.context())
            .with_negotiator(config.negotiator())
            .with_timeout(config.timeout()))
    }
}

impl<T: Transport> TntSession<T> {
    pub fn new(transport: T, context: ProtocolContext) -> Self {
        Self {
            context,
            transport,
            negotiator: Negotiator::default(),
            timeout: Duration::from_secs(20),
            last_exchange: None,
            articles: Vec::new(),
            current_article: None,
            fields: Vec::new(),
            last_order: None,
        }
    }

    pub fn with_negotiator(mut self, negotiator: Negotiator) -> Self {
        self.negotiator = negotiator;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline(always)]
    pub fn context(&self) -> &ProtocolContext {
        &self.context
    }

    /// Manual override of namespace, versions or agent.
    #[inline(always)]
    pub fn context_mut(&mut self) -> &mut ProtocolContext {
        &mut self.context
    }

    #[inline(always)]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    #[inline(always)]
    pub fn last_exchange(&self) -> Option<&Exchange> {
        self.last_exchange.as_ref()
    }

    #[inline(always)]
    pub fn articles(&self) -> &[String] {
        &self.articles
    }

    #[inline(always)]
    pub fn current_article(&self) -> Option<&str> {
        self.current_article.as_deref()
    }

    /// Full field catalogue of the current article.
    #[inline(always)]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Order name remembered from the last successful create/import.
    #[inline(always)]
    pub fn last_order(&self) -> Option<&str> {
        self.last_order.as_deref()
    }

    /// Fields needing operator input, grouped by level ascending.
    pub fn required_fields(&self) -> BTreeMap<u32, Vec<&Field>> {
        let mut by_level: BTreeMap<u32, Vec<&Field>> = BTreeMap::new();
        for field in self.fields.iter().filter(|f| f.needs_input()) {
            by_level.entry(field.level).or_default().push(field);
        }
        by_level
    }

    /// Input validator for a field of the catalogue.
    pub fn validator(field: &Field) -> Validator {
        Validator::select(&field.constraints)
    }

    /// Open the connection without sending anything.
    pub fn test_connect(&mut self) -> Result<(), TntError> {
        self.transport.connect()?;
        Ok(())
    }

    /// Disconnect; the next exchange reconnects.
    pub fn close(&mut self) {
        self.transport.close();
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Ask the server for its protocol version and adopt what it reports.
    pub fn query_version(&mut self) -> Result<Negotiated, TntError> {
        let n = self.negotiate(RequestType::QueryVersion, request::query_version)?;
        if n.is_accepted() {
            let meta = parse_meta(&n.response);
            if meta.is_empty() {
                log::warn!("[TntSession::query_version] accepted response carried no metadata");
            }
            self.context.apply_meta(&meta);
        }
        Ok(n)
    }

    /// Fetch the article list, replacing the current one on success.
    pub fn fetch_articles(&mut self) -> Result<Negotiated, TntError> {
        let n = self.negotiate(RequestType::GetArticleList, request::get_article_list)?;
        if n.is_accepted() {
            self.articles = parse_article_names(&n.response);
            log::info!("[TntSession::fetch_articles] {} articles", self.articles.len());
        }
        Ok(n)
    }

    /// Fetch the field catalogue of `article` and make it the current article.
    ///
    /// The previous catalogue is discarded either way. When the server never
    /// accepts the request no article is selected afterwards.
    pub fn fetch_fields(&mut self, article: &str) -> Result<Negotiated, TntError> {
        let article = article.trim().to_string();
        if article.is_empty() {
            return Err(TntError::MissingArticle);
        }
        let name = article.clone();
        let n = self.negotiate(RequestType::GetArticleFields, move |v| {
            request::get_article_fields(v, &name)
        })?;
        if n.is_accepted() {
            self.fields = parse_article_fields(&n.response);
            if self.fields.is_empty() {
                log::warn!("[TntSession::fetch_fields] no fields found in response");
            }
            self.current_article = Some(article);
        } else {
            log::warn!("[TntSession::fetch_fields] {} not accepted; catalogue cleared", article);
            self.fields.clear();
            self.current_article = None;
        }
        Ok(n)
    }

    /// Build an order draft for the current article from operator values.
    pub fn draft_order(
        &self,
        order_name: &str,
        values: &FieldValues,
        include_serials: bool,
    ) -> Result<OrderDraft, TntError> {
        let article = self.current_article.as_deref().ok_or(TntError::MissingArticle)?;
        Ok(OrderDraft::from_catalog(order_name, article, &self.fields, values)
            .with_serials(include_serials))
    }

    /// Send a `create-order-request` for `draft`.
    pub fn create_order(&mut self, draft: &OrderDraft) -> Result<Negotiated, TntError> {
        let serials = self.checked_serials(draft)?;
        let n = self.negotiate(RequestType::CreateOrder, |v| {
            request::create_order(v, draft, serials.as_deref())
        })?;
        self.remember_order(draft, &n);
        Ok(n)
    }

    /// Send an `import-order-request` for `draft`.
    pub fn import_order(&mut self, draft: &OrderDraft) -> Result<Negotiated, TntError> {
        let serials = self.checked_serials(draft)?;
        let n = self.negotiate(RequestType::ImportOrder, |v| {
            request::import_order(v, draft, serials.as_deref())
        })?;
        self.remember_order(draft, &n);
        Ok(n)
    }

    /// Start `order_name`, or the remembered order when it is blank.
    pub fn start_order(&mut self, order_name: &str) -> Result<Negotiated, TntError> {
        let name = match order_name.trim() {
            "" => self.last_order.clone().ok_or(TntError::MissingOrderName)?,
            entered => entered.to_string(),
        };
        self.negotiate(RequestType::StartOrder, move |v| request::start_order(v, &name))
    }

    /// Send a raw `<request>` fragment once, without negotiation.
    pub fn send_manual(&mut self, fragment: &str) -> Result<String, TntError> {
        if !request::is_request_fragment(fragment) {
            return Err(TntError::InvalidManualRequest);
        }
        self.send_inner(fragment.trim())
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn checked_serials(&self, draft: &OrderDraft) -> Result<Option<String>, TntError> {
        if draft.article_name().trim().is_empty() {
            return Err(TntError::MissingArticle);
        }
        draft.serial_xml()
    }

    fn remember_order(&mut self, draft: &OrderDraft, n: &Negotiated) {
        if is_success(&n.response) {
            log::info!("[TntSession] order {} accepted", draft.order_name());
            self.last_order = Some(draft.order_name().to_string());
        } else {
            log::warn!("[TntSession] order {} not confirmed", draft.order_name());
            self.last_order = None;
        }
    }

    fn negotiate<B>(&mut self, request_type: RequestType, build: B) -> Result<Negotiated, TntError>
    where
        B: FnMut(&str) -> String,
    {
        let negotiator = self.negotiator;
        negotiator.run(request_type, request_type.candidates(), build, |inner| {
            self.send_inner(inner)
        })
    }

    /// Wrap, send and record one request.
    fn send_inner(&mut self, inner: &str) -> Result<String, TntError> {
        let document = Envelope::new(inner).build(&self.context);
        self.last_exchange = Some(Exchange {
            request: document.clone(),
            response: String::new(),
        });
        let response = self.transport.send_and_receive(&document, self.timeout)?;
        if let Some(exchange) = self.last_exchange.as_mut() {
            exchange.response = response.clone();
        }
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
