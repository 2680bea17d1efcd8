//! NATS-based membership source.
//!
//! [`NatsMembershipSource`] implements [`MembershipSource`] over two
//! subjects published by whatever agent watches the cluster:
//!
//! - **Listing (request/reply):** `feed.list_subject`, answered with a JSON
//!   array of node records.
//! - **Events (subscribe):** `feed.events_subject`, one JSON
//!   [`NodeEvent`] per message, tagged by `type`.
//!
//! The events subscription is opened in [`NatsMembershipSource::connect`],
//! before the listing is requested, so changes published while the listing
//! is in flight stay buffered until [`MembershipSource::watch`] drains them.
//!
//! An event that fails to decode is logged and skipped; the feed keeps
//! running.

use futures::{Stream, StreamExt as _};
use nodestate_core::config::FeedConfig;
use nodestate_core::source::{MembershipSource, SourceError};
use nodestate_types::{NodeEvent, NodeRecord};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A membership source backed by a NATS connection.
pub struct NatsMembershipSource {
    /// The NATS client connection.
    client: async_nats::Client,
    /// Request subject for the full listing.
    list_subject: String,
    /// Subject carrying change events.
    events_subject: String,
    /// Subscription opened at connect time, taken by the first `watch`.
    pending: Mutex<Option<async_nats::Subscriber>>,
}

impl NatsMembershipSource {
    /// Connect to the NATS server named in `config` and subscribe to the
    /// events subject.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Connection`] if the connection fails, or
    /// [`SourceError::Subscription`] if the events subscription fails.
    pub async fn connect(config: &FeedConfig) -> Result<Self, SourceError> {
        let url = &config.nats_url;
        let client = async_nats::connect(url)
            .await
            .map_err(|e| SourceError::Connection {
                message: format!("failed to connect to NATS at {url}: {e}"),
            })?;
        let subscriber = subscribe(&client, &config.events_subject).await?;
        debug!(subject = %config.events_subject, "events subscription opened");

        Ok(Self {
            client,
            list_subject: config.list_subject.clone(),
            events_subject: config.events_subject.clone(),
            pending: Mutex::new(Some(subscriber)),
        })
    }
}

impl MembershipSource for NatsMembershipSource {
    async fn list_nodes(&self) -> Result<Vec<NodeRecord>, SourceError> {
        let reply = self
            .client
            .request(self.list_subject.clone(), Vec::<u8>::new().into())
            .await
            .map_err(|e| SourceError::Connection {
                message: format!("listing request on {} failed: {e}", self.list_subject),
            })?;
        decode_listing(&reply.payload)
    }

    async fn watch(
        &self,
        events: mpsc::UnboundedSender<NodeEvent>,
        cancel: CancellationToken,
    ) -> Result<(), SourceError> {
        let opened = self.pending.lock().await.take();
        let sub = match opened {
            Some(sub) => sub,
            None => subscribe(&self.client, &self.events_subject).await?,
        };
        info!(subject = %self.events_subject, "watching node events");

        forward_events(
            sub.map(|msg| msg.payload),
            &self.events_subject,
            &events,
            &cancel,
        )
        .await
    }
}

/// Subscribe to `subject`.
async fn subscribe(
    client: &async_nats::Client,
    subject: &str,
) -> Result<async_nats::Subscriber, SourceError> {
    client
        .subscribe(subject.to_owned())
        .await
        .map_err(|e| SourceError::Subscription {
            message: format!("failed to subscribe to {subject}: {e}"),
        })
}

/// Decode payloads from `messages` and send them to `events` until
/// cancelled.
///
/// Returns `Ok` on cancellation or when the receiver is gone, and
/// [`SourceError::Closed`] if the stream ends.
async fn forward_events<St, P>(
    messages: St,
    subject: &str,
    events: &mpsc::UnboundedSender<NodeEvent>,
    cancel: &CancellationToken,
) -> Result<(), SourceError>
where
    St: Stream<Item = P>,
    P: AsRef<[u8]>,
{
    let mut messages = std::pin::pin!(messages);
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("node event feed cancelled");
                return Ok(());
            }
            payload = messages.next() => {
                let Some(payload) = payload else {
                    return Err(SourceError::Closed);
                };
                match decode_event(payload.as_ref()) {
                    Ok(event) => {
                        if events.send(event).is_err() {
                            debug!("event receiver dropped, stopping feed");
                            return Ok(());
                        }
                    }
                    Err(e) => {
                        warn!(
                            subject = %subject,
                            error = %e,
                            "Failed to deserialize node event, skipping"
                        );
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for NatsMembershipSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsMembershipSource")
            .field("list_subject", &self.list_subject)
            .field("events_subject", &self.events_subject)
            .finish_non_exhaustive()
    }
}

/// Decode a listing reply.
fn decode_listing(payload: &[u8]) -> Result<Vec<NodeRecord>, SourceError> {
    serde_json::from_slice(payload).map_err(|e| SourceError::Decode {
        message: format!("invalid node listing: {e}"),
    })
}

/// Decode one event message.
fn decode_event(payload: &[u8]) -> Result<NodeEvent, serde_json::Error> {
    serde_json::from_slice(payload)
}
