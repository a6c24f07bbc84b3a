/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Request version negotiation.
//!
//! The server rejects a request whose version it does not accept with a
//! `version-error`, optionally naming the version it wants in a
//! `<concerning>` element. [`Negotiator::run`] walks the candidate list:
//!
//! ```text
//! for each untried candidate:
//!     send → accepted?                       → Accepted
//!     version-error, <concerning> untried?   → send that version now
//!         (up to max_concerning_retries times in a row)
//!     still failing                          → next candidate
//! all candidates tried                       → Exhausted(last response)
//! ```
//!
//! Exhaustion is not an error: the protocol has no universal status field,
//! so the last response is handed back for the caller to inspect.

use crate::convert::{concerning_version, is_version_error};
use crate::error::TntError;
use crate::request::RequestType;

/// How a negotiation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server accepted the request at this version.
    Accepted { version: String },
    /// Every reachable version was rejected.
    Exhausted,
}

/// Result of one negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    pub request_type: RequestType,
    pub outcome: Outcome,
    /// Last response received (the accepted one, or the final rejection).
    pub response: String,
    /// Versions sent, in order.
    pub attempts: Vec<String>,
}

impl Negotiated {
    #[inline(always)]
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, Outcome::Accepted { .. })
    }

    /// Accepted version, if any.
    pub fn version(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Accepted { version } => Some(version),
            Outcome::Exhausted => None,
        }
    }

    #[inline(always)]
    pub fn round_trips(&self) -> usize {
        self.attempts.len()
    }
}

/// Drives the build → send → inspect → retry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiator {
    max_concerning_retries: usize,
}

impl Default for Negotiator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Negotiator {
    /// `max_concerning_retries` bounds how many successive `<concerning>`
    /// corrections are followed before falling back to the candidate list.
    pub fn new(max_concerning_retries: usize) -> Self {
        Self {
            max_concerning_retries,
        }
    }

    #[inline(always)]
    pub fn max_concerning_retries(&self) -> usize {
        self.max_concerning_retries
    }

    /// Negotiate one request.
    ///
    /// `build` renders the inner request for a version; `send` performs one
    /// round trip and returns the response text. A `send` error aborts the
    /// negotiation immediately.
    pub fn run<B, S>(
        &self,
        request_type: RequestType,
        candidates: &[&str],
        mut build: B,
        mut send: S,
    ) -> Result<Negotiated, TntError>
    where
        B: FnMut(&str) -> String,
        S: FnMut(&str) -> Result<String, TntError>,
    {
        if candidates.is_empty() {
            return Err(TntError::NoCandidates(request_type));
        }

        let mut attempts: Vec<String> = Vec::new();
        let mut last = String::new();

        let mut attempt = |version: &str, attempts: &mut Vec<String>| -> Result<String, TntError> {
            attempts.push(version.to_string());
            log::debug!("[Negotiator::run] {} trying version {}", request_type, version);
            send(&build(version))
        };

        for &candidate in candidates {
            if attempts.iter().any(|v| v == candidate) {
                continue;
            }
            let mut version = candidate.to_string();
            let mut response = attempt(&version, &mut attempts)?;
            let mut forced = 0;

            while is_version_error(&response) {
                log::debug!("[Negotiator::run] {} rejected version {}", request_type, version);
                if forced >= self.max_concerning_retries {
                    break;
                }
                let Some(wanted) = concerning_version(&response) else {
                    break;
                };
                if attempts.contains(&wanted) {
                    break;
                }
                log::info!(
                    "[Negotiator::run] {} server asks for version {}",
                    request_type,
                    wanted
                );
                forced += 1;
                version = wanted;
                response = attempt(&version, &mut attempts)?;
            }

            if !is_version_error(&response) {
                return Ok(Negotiated {
                    request_type,
                    outcome: Outcome::Accepted { version },
                    response,
                    attempts,
                });
            }
            last = response;
        }

        log::warn!(
            "[Negotiator::run] {} exhausted after versions {:?}",
            request_type,
            attempts
        );
        Ok(Negotiated {
            request_type,
            outcome: Outcome::Exhausted,
            response: last,
            attempts,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::request;

    fn version_error(concerning: Option<&str>) -> String {
        match concerning {
            Some(v) => format!(
                "<tnt><response><error>version-error</error><concerning>{v}</concerning></response></tnt>"
            ),
            None => "<tnt><response><error>version-error</error></response></tnt>".to_string(),
        }
    }

    fn ok() -> String {
        "<tnt><response><return-value>ok</return-value></response></tnt>".to_string()
    }

    /// Extract the version attribute from an inner request.
    fn sent_version(inner: &str) -> String {
        let start = inner.find("version=\"").unwrap() + 9;
        let end = start + inner[start..].find('"').unwrap();
        inner[start..end].to_string()
    }

    #[test]
    fn test_first_candidate_accepted() {
        let n = Negotiator::default()
            .run(
                RequestType::GetArticleList,
                &["2.0", "1.1", "1.0"],
                request::get_article_list,
                |_| Ok(ok()),
            )
            .unwrap();
        assert!(n.is_accepted());
        assert_eq!(n.version(), Some("2.0"));
        assert_eq!(n.round_trips(), 1);
    }

    #[test]
    fn test_concerning_jump_converges_in_two_round_trips() {
        let n = Negotiator::default()
            .run(
                RequestType::StartOrder,
                &["2.0", "1.1", "1.0"],
                |v| request::start_order(v, "O"),
                |inner| {
                    if sent_version(inner) == "1.1" {
                        Ok(ok())
                    } else {
                        Ok(version_error(Some("1.1")))
                    }
                },
            )
            .unwrap();
        assert_eq!(n.version(), Some("1.1"));
        assert_eq!(n.attempts, vec!["2.0", "1.1"]);
    }

    #[test]
    fn test_concerning_jump_bypasses_candidate_order() {
        let n = Negotiator::default()
            .run(
                RequestType::CreateOrder,
                &["2.0", "1.2", "1.1", "1.0"],
                request::query_version,
                |inner| match sent_version(inner).as_str() {
                    "1.0" => Ok(ok()),
                    _ => Ok(version_error(Some("1.0"))),
                },
            )
            .unwrap();
        assert_eq!(n.attempts, vec!["2.0", "1.0"]);
        assert_eq!(n.version(), Some("1.0"));
    }

    #[test]
    fn test_all_errors_without_concerning_terminates() {
        let mut calls = 0;
        let n = Negotiator::default()
            .run(
                RequestType::GetArticleList,
                &["2.0", "1.1", "1.0"],
                request::get_article_list,
                |_| {
                    calls += 1;
                    Ok(version_error(None))
                },
            )
            .unwrap();
        assert_eq!(n.outcome, Outcome::Exhausted);
        assert_eq!(calls, 3);
        assert_eq!(n.response, version_error(None));
    }

    #[test]
    fn test_failed_forced_retry_falls_back_to_candidates() {
        // Server names 1.1 but rejects it too; only 1.0 works.
        let n = Negotiator::default()
            .run(
                RequestType::StartOrder,
                &["2.0", "1.1", "1.0"],
                request::query_version,
                |inner| match sent_version(inner).as_str() {
                    "1.0" => Ok(ok()),
                    _ => Ok(version_error(Some("1.1"))),
                },
            )
            .unwrap();
        // 1.1 is not retried from the candidate list.
        assert_eq!(n.attempts, vec!["2.0", "1.1", "1.0"]);
        assert_eq!(n.version(), Some("1.0"));
    }

    #[test]
    fn test_concerning_already_tried_is_ignored() {
        let n = Negotiator::default()
            .run(
                RequestType::StartOrder,
                &["2.0", "1.0"],
                request::query_version,
                |_| Ok(version_error(Some("2.0"))),
            )
            .unwrap();
        assert_eq!(n.attempts, vec!["2.0", "1.0"]);
        assert!(!n.is_accepted());
    }

    #[test]
    fn test_single_forced_retry_by_default() {
        // Each rejection names a new version; the default bound follows one.
        let n = Negotiator::default()
            .run(
                RequestType::QueryVersion,
                &["2.0"],
                request::query_version,
                |inner| match sent_version(inner).as_str() {
                    "2.0" => Ok(version_error(Some("1.5"))),
                    "1.5" => Ok(version_error(Some("1.2"))),
                    _ => Ok(ok()),
                },
            )
            .unwrap();
        assert_eq!(n.attempts, vec!["2.0", "1.5"]);
        assert_eq!(n.outcome, Outcome::Exhausted);
    }

    #[test]
    fn test_configurable_retry_bound() {
        let n = Negotiator::new(3)
            .run(
                RequestType::QueryVersion,
                &["2.0"],
                request::query_version,
                |inner| match sent_version(inner).as_str() {
                    "2.0" => Ok(version_error(Some("1.5"))),
                    "1.5" => Ok(version_error(Some("1.2"))),
                    _ => Ok(ok()),
                },
            )
            .unwrap();
        assert_eq!(n.attempts, vec!["2.0", "1.5", "1.2"]);
        assert_eq!(n.version(), Some("1.2"));
    }

    #[test]
    fn test_zero_bound_never_jumps() {
        let n = Negotiator::new(0)
            .run(
                RequestType::StartOrder,
                &["2.0", "1.0"],
                request::query_version,
                |inner| match sent_version(inner).as_str() {
                    "1.0" => Ok(ok()),
                    _ => Ok(version_error(Some("1.1"))),
                },
            )
            .unwrap();
        assert_eq!(n.attempts, vec!["2.0", "1.0"]);
    }

    #[test]
    fn test_empty_candidates_is_error() {
        let err = Negotiator::default()
            .run(RequestType::StartOrder, &[], request::query_version, |_| Ok(ok()))
            .unwrap_err();
        assert!(matches!(err, TntError::NoCandidates(RequestType::StartOrder)));
    }

    #[test]
    fn test_transport_error_aborts() {
        let mut calls = 0;
        let err = Negotiator::default()
            .run(
                RequestType::GetArticleList,
                &["2.0", "1.1"],
                request::get_article_list,
                |_| {
                    calls += 1;
                    Err(TransportError::NotConnected.into())
                },
            )
            .unwrap_err();
        assert!(matches!(err, TntError::Transport(_)));
        assert_eq!(calls, 1);
    }
}
