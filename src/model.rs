//! Entities the rules engine reads: organizations, contact groups, labels,
//! contacts and inbound messages.
//!
//! These mirror what the message store persists. The engine never mutates
//! them directly; actions ask the [`Store`](crate::store::Store) to.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Primary key of a stored message.
pub type MessageId = i64;

/// Tenant scope. Groups and labels are only resolvable within their org.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
    pub id: i64,
    pub name: String,
}

/// A contact group.
///
/// Identity is the UUID; `id` is the stable ordering key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub uuid: Uuid,
    pub org_id: i64,
    pub name: String,
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for Group {}

impl Hash for Group {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

/// A message label with its keyword configuration.
///
/// Identity is the UUID, so two copies of the same label loaded at
/// different times compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub uuid: Uuid,
    pub org_id: i64,
    pub name: String,
    /// Keywords that auto-apply this label.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

/// The sender of a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    pub uuid: Uuid,
    /// UUIDs of the groups the contact currently belongs to.
    #[serde(default)]
    pub groups: Vec<Uuid>,
    /// Custom contact fields, keyed by field key.
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

impl Contact {
    /// Whether the contact is currently a member of `group`.
    pub fn in_group(&self, group: &Group) -> bool {
        self.groups.contains(&group.uuid)
    }

    /// Value of a contact field, or `""` if the contact has no such field.
    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }
}

/// An inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub org_id: i64,
    pub text: String,
    pub contact: Contact,
    /// UUIDs of the labels currently applied.
    #[serde(default)]
    pub labels: Vec<Uuid>,
    #[serde(default)]
    pub is_flagged: bool,
    #[serde(default)]
    pub is_archived: bool,
    pub created_on: DateTime<Utc>,
}

impl Message {
    /// Whether `label` is currently applied to this message.
    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(&label.uuid)
    }
}
