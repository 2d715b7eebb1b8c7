//! Actions: what a matching rule does to its messages.
//!
//! Serialized form: `{"type": "label", "label": <label uuid>}`,
//! `{"type": "flag"}` or `{"type": "archive"}`.

use std::fmt;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use super::context::{DeserializationContext, discriminator};
use crate::backend::Backend;
use crate::error::{self, RuleError};
use crate::model::{Label, Message, MessageId, Org};
use crate::store::Store;

/// An effect applied to a set of messages.
///
/// Equality and hashing are by type and payload (a label compares by its
/// UUID), so actions are usable directly as deduplication keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Associate a label with the messages.
    Label(Label),
    Flag,
    Archive,
}

#[derive(Deserialize)]
struct LabelSpec {
    label: Uuid,
}

impl Action {
    pub const LABEL: &'static str = "label";
    pub const FLAG: &'static str = "flag";
    pub const ARCHIVE: &'static str = "archive";

    /// The `type` discriminator of this action.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Label(_) => Self::LABEL,
            Self::Flag => Self::FLAG,
            Self::Archive => Self::ARCHIVE,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Label(label) => json!({"type": Self::LABEL, "label": label.uuid}),
            Self::Flag | Self::Archive => json!({"type": self.type_name()}),
        }
    }

    /// Build an action from its serialized form, resolving the label
    /// reference in the context's org.
    pub async fn from_json(
        value: &Value,
        ctx: &DeserializationContext<'_>,
    ) -> error::Result<Self> {
        match discriminator(value, "action")? {
            Self::LABEL => {
                let spec: LabelSpec =
                    serde_json::from_value(value.clone()).map_err(RuleError::from)?;
                let label = ctx.store.get_label(ctx.org, spec.label).await?;
                Ok(Self::Label(label))
            }
            Self::FLAG => Ok(Self::Flag),
            Self::ARCHIVE => Ok(Self::Archive),
            other => Err(RuleError::UnknownActionType(other.to_string()).into()),
        }
    }

    /// Apply this action to an already deduplicated set of messages.
    ///
    /// Makes one bulk store update followed by one backend call, however
    /// many messages there are. Nothing is called for an empty set.
    pub async fn apply_to(
        &self,
        org: &Org,
        messages: &[&Message],
        store: &dyn Store,
        backend: &dyn Backend,
    ) -> error::Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let ids: Vec<MessageId> = messages.iter().map(|m| m.id).collect();
        debug!(
            action = %self,
            count = ids.len(),
            backend = backend.name(),
            "Applying action"
        );

        match self {
            Self::Label(label) => {
                store.add_label(org, &ids, label).await?;
                backend.label_messages(org, messages, label).await?;
            }
            Self::Flag => {
                store.set_flagged(org, &ids).await?;
                backend.flag_messages(org, messages).await?;
            }
            Self::Archive => {
                store.set_archived(org, &ids).await?;
                backend.archive_messages(org, messages).await?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => write!(f, "label:{}", label.name),
            _ => f.write_str(self.type_name()),
        }
    }
}
