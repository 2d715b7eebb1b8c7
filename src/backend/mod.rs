//! External delivery backend.
//!
//! Actions tell the backend which messages they labelled, flagged or
//! archived so an external system can mirror the change. Each distinct
//! action in a batch makes exactly one backend call.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::BackendError;
use crate::model::{Label, Message, MessageId, Org};

/// Sink for message state changes made by actions.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Messages were labelled with `label`.
    async fn label_messages(
        &self,
        org: &Org,
        messages: &[&Message],
        label: &Label,
    ) -> Result<(), BackendError>;

    /// Messages were flagged.
    async fn flag_messages(&self, org: &Org, messages: &[&Message]) -> Result<(), BackendError>;

    /// Messages were archived.
    async fn archive_messages(&self, org: &Org, messages: &[&Message])
    -> Result<(), BackendError>;
}

// ── No-op backend ───────────────────────────────────────────────────

/// Backend for orgs with no external system: logs and succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBackend;

#[async_trait]
impl Backend for NoopBackend {
    fn name(&self) -> &str {
        "noop"
    }

    async fn label_messages(
        &self,
        org: &Org,
        messages: &[&Message],
        label: &Label,
    ) -> Result<(), BackendError> {
        debug!(org = org.id, label = %label.name, count = messages.len(), "Noop label");
        Ok(())
    }

    async fn flag_messages(&self, org: &Org, messages: &[&Message]) -> Result<(), BackendError> {
        debug!(org = org.id, count = messages.len(), "Noop flag");
        Ok(())
    }

    async fn archive_messages(
        &self,
        org: &Org,
        messages: &[&Message],
    ) -> Result<(), BackendError> {
        debug!(org = org.id, count = messages.len(), "Noop archive");
        Ok(())
    }
}

// ── Recording backend ───────────────────────────────────────────────

/// Which backend operation was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendOperation {
    Label,
    Flag,
    Archive,
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendCall {
    pub operation: BackendOperation,
    /// Set for label calls only.
    pub label: Option<Uuid>,
    /// Ids of the messages in the call, ascending.
    pub messages: Vec<MessageId>,
}

/// Backend that remembers every call it receives.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the calls received so far, in call order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, operation: BackendOperation, label: Option<Uuid>, messages: &[&Message]) {
        let mut ids: Vec<MessageId> = messages.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(BackendCall {
                operation,
                label,
                messages: ids,
            });
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    async fn label_messages(
        &self,
        _org: &Org,
        messages: &[&Message],
        label: &Label,
    ) -> Result<(), BackendError> {
        self.record(BackendOperation::Label, Some(label.uuid), messages);
        Ok(())
    }

    async fn flag_messages(&self, _org: &Org, messages: &[&Message]) -> Result<(), BackendError> {
        self.record(BackendOperation::Flag, None, messages);
        Ok(())
    }

    async fn archive_messages(
        &self,
        _org: &Org,
        messages: &[&Message],
    ) -> Result<(), BackendError> {
        self.record(BackendOperation::Archive, None, messages);
        Ok(())
    }
}
