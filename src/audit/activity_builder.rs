use std::fmt::Display;
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::errors::InternalError;
use crate::stores::ActivityStore;
use crate::types::internal::{ActivityEvent, ActivityType, RequestContext};

/// Fluent construction of one activity log entry
///
/// Details are appended to the description as `key=value` pairs; sensitive
/// values are replaced by a short SHA-256 fingerprint so related entries can
/// still be correlated.
///
/// ```ignore
/// logger
///     .builder(ActivityType::Custom("backup_restored".into()))
///     .with_context(&ctx)
///     .describe("Backup restored")
///     .detail("file", "records-2024-06-01.db")
///     .record()
///     .await;
/// ```
pub struct ActivityBuilder {
    store: Arc<ActivityStore>,
    activity_type: ActivityType,
    user_id: Option<String>,
    description: String,
    details: Vec<(String, String)>,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl ActivityBuilder {
    pub fn new(store: Arc<ActivityStore>, activity_type: ActivityType) -> Self {
        Self {
            store,
            activity_type,
            user_id: None,
            description: String::new(),
            details: Vec::new(),
            ip_address: None,
            user_agent: None,
        }
    }

    /// Client address and agent from the request
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        self.ip_address = ctx.ip_string();
        self.user_agent = ctx.user_agent.clone();
        self
    }

    /// The account the entry is about
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn detail(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.details.push((key.into(), value.to_string()));
        self
    }

    pub fn sensitive(mut self, key: impl Into<String>, value: impl Display) -> Self {
        let digest = Sha256::digest(value.to_string().as_bytes());
        let fingerprint = format!("sha256:{:x}", digest);
        // 16 hex chars are plenty for correlation
        self.details.push((key.into(), fingerprint[..23].to_string()));
        self
    }

    pub fn build(self) -> ActivityEvent {
        let description = if self.details.is_empty() {
            self.description
        } else {
            let details = self
                .details
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} ({})", self.description, details)
        };

        ActivityEvent {
            activity_type: self.activity_type,
            user_id: self.user_id,
            description,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
        }
    }

    /// Write the entry, returning its id
    pub async fn write(self) -> Result<i64, InternalError> {
        let store = self.store.clone();
        store.write_entry(self.build(), Utc::now().timestamp()).await
    }

    /// Write the entry; a failure is reported to the operational log only
    pub async fn record(self) {
        let activity_type = self.activity_type.clone();
        if let Err(e) = self.write().await {
            tracing::error!("Failed to log {} activity: {}", activity_type, e);
        }
    }
}
