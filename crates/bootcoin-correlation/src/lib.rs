//! Bootcoin Correlation - Awaitable request/response over fire-and-forget events
//!
//! The bridge turns an event publication into an awaitable call: the caller
//! registers a pending entry keyed by the request's correlation id, publishes,
//! and suspends until the matching response event arrives or the deadline
//! expires. Resolution is at-most-once; late, duplicate, and unknown response
//! ids are ignored.
//!
//! The bridge is an injected component, owned by whoever constructs the
//! service graph. Its pending table is the one piece of shared mutable state
//! in the core and supports concurrent insert/lookup/remove from arbitrary
//! caller and responder tasks.

use std::sync::Arc;
use std::time::Duration;

use bootcoin_messaging::{encode, MessagePublisher};
use bootcoin_types::{
    BootCoinError, CorrelationId, Result, ValidationRequest, ValidationResponse,
};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Default deadline for a response to arrive
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// A registered wait for one response event
struct PendingCorrelation {
    completion: oneshot::Sender<ValidationResponse>,
    created_at: DateTime<Utc>,
}

/// Correlation bridge over a messaging transport
pub struct CorrelationBridge {
    publisher: Arc<dyn MessagePublisher>,
    pending: DashMap<CorrelationId, PendingCorrelation>,
    response_timeout: Duration,
}

impl CorrelationBridge {
    /// Create a bridge with an explicit response deadline
    pub fn new(publisher: Arc<dyn MessagePublisher>, response_timeout: Duration) -> Self {
        Self {
            publisher,
            pending: DashMap::new(),
            response_timeout,
        }
    }

    /// Create a bridge with [`DEFAULT_RESPONSE_TIMEOUT`]
    pub fn with_default_timeout(publisher: Arc<dyn MessagePublisher>) -> Self {
        Self::new(publisher, DEFAULT_RESPONSE_TIMEOUT)
    }

    /// Publish `request` on `topic` and await its response
    ///
    /// Resolves `Ok(())` on a `success = true` response, a typed
    /// *validation-rejected* error on `success = false`, and a typed
    /// *correlation-timeout* error when no response arrives inside the
    /// deadline. The pending entry is removed on every exit path.
    pub async fn send_and_await(&self, topic: &str, request: ValidationRequest) -> Result<()> {
        let correlation_id = request.correlation_id.clone();
        let payload = encode(&request)?;

        let (completion, wait) = oneshot::channel();
        match self.pending.entry(correlation_id.clone()) {
            Entry::Occupied(_) => {
                return Err(BootCoinError::DuplicateCorrelation {
                    correlation_id: correlation_id.to_string(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingCorrelation {
                    completion,
                    created_at: Utc::now(),
                });
            }
        }

        if let Err(e) = self.publisher.publish(topic, payload).await {
            self.pending.remove(&correlation_id);
            return Err(e);
        }
        debug!("correlation {correlation_id} awaiting response on {topic}");

        match tokio::time::timeout(self.response_timeout, wait).await {
            Ok(Ok(response)) => {
                if response.success {
                    Ok(())
                } else {
                    Err(BootCoinError::ValidationRejected {
                        reason: response
                            .error_message
                            .unwrap_or_else(|| "no reason given".to_string()),
                    })
                }
            }
            // The entry was removed without completing (explicit cancel)
            Ok(Err(_)) => Err(BootCoinError::transport(format!(
                "correlation {correlation_id} cancelled before a response arrived"
            ))),
            Err(_) => {
                self.pending.remove(&correlation_id);
                warn!(
                    "correlation {correlation_id} timed out after {:?}",
                    self.response_timeout
                );
                Err(BootCoinError::CorrelationTimeout {
                    correlation_id: correlation_id.to_string(),
                })
            }
        }
    }

    /// Deliver an inbound response event
    ///
    /// Removes the pending entry and completes the waiter, exactly once.
    /// A response bearing an unknown id (late, duplicate, or addressed to an
    /// unrelated caller) has no effect.
    pub fn resolve(&self, response: ValidationResponse) {
        match self.pending.remove(&response.correlation_id) {
            Some((id, entry)) => {
                debug!(
                    "correlation {id} resolved (success = {}, waited since {})",
                    response.success, entry.created_at
                );
                // The waiter may have just timed out; its receiver is gone
                // and the send result does not matter.
                let _ = entry.completion.send(response);
            }
            None => {
                debug!(
                    "ignoring response for unknown correlation {}",
                    response.correlation_id
                );
            }
        }
    }

    /// Drop a pending wait without resolving it
    ///
    /// The blocked caller observes a cancellation error. Returns whether an
    /// entry existed.
    pub fn cancel(&self, correlation_id: &CorrelationId) -> bool {
        self.pending.remove(correlation_id).is_some()
    }

    /// Number of requests currently awaiting a response
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
