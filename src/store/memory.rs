//! In-memory store with a broadcast feed of message state changes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;
use uuid::Uuid;

use super::traits::Store;
use crate::error::StoreError;
use crate::model::{Group, Label, Message, MessageId, Org};

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// A change in message state, published to subscribers such as statistics
/// counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A label was newly associated with a message. `day` is the day the
    /// message was created (UTC).
    MessageLabelled {
        message: MessageId,
        label: Uuid,
        day: NaiveDate,
    },
    MessageFlagged {
        message: MessageId,
    },
    MessageArchived {
        message: MessageId,
    },
}

#[derive(Default)]
struct Inner {
    groups: Vec<Group>,
    labels: Vec<Label>,
    messages: BTreeMap<MessageId, Message>,
}

/// `Store` held entirely in memory.
pub struct MemoryStore {
    inner: RwLock<Inner>,
    tx: broadcast::Sender<StoreEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self {
            inner: RwLock::new(Inner::default()),
            tx,
        }
    }

    /// Subscribe to message state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    pub async fn insert_group(&self, group: Group) {
        self.inner.write().await.groups.push(group);
    }

    pub async fn insert_label(&self, label: Label) {
        self.inner.write().await.labels.push(label);
    }

    /// Insert a message, replacing any message with the same id.
    pub async fn insert_message(&self, message: Message) {
        self.inner.write().await.messages.insert(message.id, message);
    }

    /// Current state of a message.
    pub async fn message(&self, id: MessageId) -> Option<Message> {
        self.inner.read().await.messages.get(&id).cloned()
    }

    /// All messages of the org, ordered by id.
    pub async fn messages(&self, org: &Org) -> Vec<Message> {
        self.inner
            .read()
            .await
            .messages
            .values()
            .filter(|m| m.org_id == org.id)
            .cloned()
            .collect()
    }

    /// Apply `update` to each message of the org in `ids`, broadcasting an
    /// event for every message it reports as changed.
    ///
    /// Every id must name a message of the org; otherwise nothing is
    /// updated and `NotFound` names the first id that does not.
    async fn update_messages<F>(
        &self,
        org: &Org,
        ids: &[MessageId],
        mut update: F,
    ) -> Result<usize, StoreError>
    where
        F: FnMut(&mut Message) -> Option<StoreEvent>,
    {
        let mut inner = self.inner.write().await;

        if let Some(missing) = ids.iter().find(|id| {
            !inner
                .messages
                .get(*id)
                .is_some_and(|message| message.org_id == org.id)
        }) {
            return Err(StoreError::NotFound {
                entity: "message".into(),
                id: missing.to_string(),
            });
        }

        let mut changed = 0;
        for id in ids {
            let Some(message) = inner.messages.get_mut(id) else {
                continue;
            };
            if let Some(event) = update(message) {
                changed += 1;
                // Broadcast, ok if nobody is subscribed
                let _ = self.tx.send(event);
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_label(&self, org: &Org, uuid: Uuid) -> Result<Label, StoreError> {
        self.inner
            .read()
            .await
            .labels
            .iter()
            .find(|l| l.org_id == org.id && l.uuid == uuid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "label".into(),
                id: uuid.to_string(),
            })
    }

    async fn get_labels(&self, org: &Org) -> Result<Vec<Label>, StoreError> {
        let mut labels: Vec<Label> = self
            .inner
            .read()
            .await
            .labels
            .iter()
            .filter(|l| l.org_id == org.id)
            .cloned()
            .collect();
        labels.sort_by_key(|l| l.id);
        Ok(labels)
    }

    async fn get_groups(&self, org: &Org, uuids: &[Uuid]) -> Result<Vec<Group>, StoreError> {
        let inner = self.inner.read().await;
        let mut groups = Vec::with_capacity(uuids.len());
        for uuid in uuids {
            let group = inner
                .groups
                .iter()
                .find(|g| g.org_id == org.id && g.uuid == *uuid)
                .ok_or_else(|| StoreError::NotFound {
                    entity: "group".into(),
                    id: uuid.to_string(),
                })?;
            groups.push(group.clone());
        }
        groups.sort_by_key(|g| g.id);
        groups.dedup_by_key(|g| g.id);
        Ok(groups)
    }

    async fn add_label(
        &self,
        org: &Org,
        ids: &[MessageId],
        label: &Label,
    ) -> Result<(), StoreError> {
        let changed = self
            .update_messages(org, ids, |message| {
                if message.has_label(label) {
                    return None;
                }
                message.labels.push(label.uuid);
                Some(StoreEvent::MessageLabelled {
                    message: message.id,
                    label: label.uuid,
                    day: message.created_on.date_naive(),
                })
            })
            .await?;
        debug!(label = %label.name, requested = ids.len(), changed, "Labelled messages");
        Ok(())
    }

    async fn set_flagged(&self, org: &Org, ids: &[MessageId]) -> Result<(), StoreError> {
        let changed = self
            .update_messages(org, ids, |message| {
                if message.is_flagged {
                    return None;
                }
                message.is_flagged = true;
                Some(StoreEvent::MessageFlagged {
                    message: message.id,
                })
            })
            .await?;
        debug!(requested = ids.len(), changed, "Flagged messages");
        Ok(())
    }

    async fn set_archived(&self, org: &Org, ids: &[MessageId]) -> Result<(), StoreError> {
        let changed = self
            .update_messages(org, ids, |message| {
                if message.is_archived {
                    return None;
                }
                message.is_archived = true;
                Some(StoreEvent::MessageArchived {
                    message: message.id,
                })
            })
            .await?;
        debug!(requested = ids.len(), changed, "Archived messages");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::Contact;

    fn make_org(id: i64) -> Org {
        Org {
            id,
            name: format!("Org {id}"),
        }
    }

    fn make_label(id: i64, org_id: i64, name: &str) -> Label {
        Label {
            id,
            uuid: Uuid::new_v4(),
            org_id,
            name: name.into(),
            keywords: vec![],
        }
    }

    fn make_group(id: i64, org_id: i64, name: &str) -> Group {
        Group {
            id,
            uuid: Uuid::new_v4(),
            org_id,
            name: name.into(),
        }
    }

    fn make_message(id: MessageId, org_id: i64) -> Message {
        Message {
            id,
            org_id,
            text: format!("message {id}"),
            contact: Contact::default(),
            labels: vec![],
            is_flagged: false,
            is_archived: false,
            created_on: Utc.with_ymd_and_hms(2016, 3, 1, 23, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn label_lookup_is_org_scoped() {
        let store = MemoryStore::new();
        let label = make_label(1, 1, "Help");
        store.insert_label(label.clone()).await;

        assert_eq!(store.get_label(&make_org(1), label.uuid).await.unwrap(), label);

        let err = store.get_label(&make_org(2), label.uuid).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref entity, .. } if entity == "label"));
    }

    #[tokio::test]
    async fn labels_ordered_by_id() {
        let store = MemoryStore::new();
        store.insert_label(make_label(3, 1, "C")).await;
        store.insert_label(make_label(1, 1, "A")).await;
        store.insert_label(make_label(2, 2, "Other org")).await;

        let names: Vec<String> = store
            .get_labels(&make_org(1))
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn groups_ordered_by_id_and_missing_fails() {
        let store = MemoryStore::new();
        let youth = make_group(5, 1, "Youth");
        let adults = make_group(2, 1, "Adults");
        store.insert_group(youth.clone()).await;
        store.insert_group(adults.clone()).await;

        let org = make_org(1);
        let groups = store
            .get_groups(&org, &[youth.uuid, adults.uuid])
            .await
            .unwrap();
        assert_eq!(groups, vec![adults.clone(), youth.clone()]);

        let missing = Uuid::new_v4();
        let err = store
            .get_groups(&org, &[adults.uuid, missing])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref id, .. } if *id == missing.to_string()));
    }

    #[tokio::test]
    async fn add_label_emits_only_new_associations() {
        let store = MemoryStore::new();
        let org = make_org(1);
        let label = make_label(1, 1, "Help");
        store.insert_message(make_message(10, 1)).await;
        store.insert_message(make_message(11, 1)).await;
        let mut rx = store.subscribe();

        store.add_label(&org, &[10], &label).await.unwrap();
        store.add_label(&org, &[10, 11], &label).await.unwrap();

        let day = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::MessageLabelled {
                message: 10,
                label: label.uuid,
                day
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::MessageLabelled {
                message: 11,
                label: label.uuid,
                day
            }
        );
        assert!(rx.try_recv().is_err());

        assert_eq!(store.message(10).await.unwrap().labels, vec![label.uuid]);
    }

    #[tokio::test]
    async fn updates_reject_other_orgs_and_unknown_ids() {
        let store = MemoryStore::new();
        let org = make_org(1);
        store.insert_message(make_message(1, 1)).await;
        store.insert_message(make_message(2, 2)).await;
        let mut rx = store.subscribe();

        let err = store.set_flagged(&org, &[1, 2]).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref entity, ref id } if entity == "message" && id == "2"));

        let err = store.set_archived(&org, &[1, 99]).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref id, .. } if id == "99"));

        let label = make_label(1, 1, "Help");
        assert!(store.add_label(&org, &[99], &label).await.is_err());

        // A rejected update leaves every message untouched.
        let stored = store.message(1).await.unwrap();
        assert!(!stored.is_flagged);
        assert!(!stored.is_archived);
        assert!(stored.labels.is_empty());
        assert!(!store.message(2).await.unwrap().is_flagged);
        assert!(rx.try_recv().is_err());

        store.set_flagged(&org, &[1]).await.unwrap();
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::MessageFlagged { message: 1 });
    }

    #[tokio::test]
    async fn archive_emits_on_transition_only() {
        let store = MemoryStore::new();
        let org = make_org(1);
        store.insert_message(make_message(1, 1)).await;
        let mut rx = store.subscribe();

        store.set_archived(&org, &[1]).await.unwrap();
        store.set_archived(&org, &[1]).await.unwrap();

        assert_eq!(rx.try_recv().unwrap(), StoreEvent::MessageArchived { message: 1 });
        assert!(rx.try_recv().is_err());
        assert_eq!(store.messages(&org).await.len(), 1);
    }
}
