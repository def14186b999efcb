//! Best-effort remote follow-up push.
//!
//! Each intake produces one [`FollowUpBundle`] that is offered to a remote
//! endpoint exactly once, bounded by the configured timeout. This is a
//! non-guaranteed side channel, not a reliability mechanism: non-2xx
//! responses, network errors, and a missing endpoint are all discarded the
//! same way. The [`SyncChannel`] trait keeps the pipeline decoupled so a
//! durable outbox with retries can replace the HTTP impl without touching
//! callers.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::SyncConfig;
use crate::models::{Contact, LiveFollowUp, OriginKind};

pub const BUNDLE_VERSION: u32 = 1;

/// Normalized follow-up + contact + origin bundle pushed after each intake.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpBundle {
    pub version: u32,
    pub origin_type: OriginKind,
    pub origin_ref: Option<String>,
    pub origin_id: String,
    pub follow_up_id: String,
    pub contact: Contact,
    pub follow_up: LiveFollowUp,
    pub raw_payload: serde_json::Value,
    pub created_at: i64,
}

/// One-way delivery channel for follow-up bundles. The signature is
/// infallible on purpose: no implementation may surface a failure to the
/// intake pipeline.
#[async_trait]
pub trait SyncChannel: Send + Sync {
    async fn push(&self, bundle: FollowUpBundle);
}

/// Single-attempt HTTP push with a bounded timeout.
pub struct HttpSyncChannel {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSyncChannel {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SyncChannel for HttpSyncChannel {
    async fn push(&self, bundle: FollowUpBundle) {
        let follow_up_id = bundle.follow_up_id.clone();
        match self.client.post(&self.endpoint).json(&bundle).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(%follow_up_id, "follow-up sync delivered");
            }
            Ok(resp) => {
                debug!(%follow_up_id, status = %resp.status(), "follow-up sync rejected, dropping");
            }
            Err(err) => {
                debug!(%follow_up_id, error = %err, "follow-up sync failed, dropping");
            }
        }
    }
}

/// No-op channel used when sync is disabled or no endpoint is configured.
pub struct DisabledSync;

#[async_trait]
impl SyncChannel for DisabledSync {
    async fn push(&self, _bundle: FollowUpBundle) {}
}

pub fn channel_from_config(sync: &SyncConfig) -> Result<Arc<dyn SyncChannel>> {
    match (&sync.endpoint, sync.is_active()) {
        (Some(endpoint), true) => {
            let timeout = Duration::from_secs(sync.timeout_secs);
            Ok(Arc::new(HttpSyncChannel::new(endpoint.clone(), timeout)?))
        }
        _ => Ok(Arc::new(DisabledSync)),
    }
}
