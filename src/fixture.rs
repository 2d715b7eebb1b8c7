//! JSON workspace loaded by the binary: one org with its groups, labels,
//! messages and rule descriptions.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{self, ConfigError};
use crate::model::{Group, Label, Message, Org};
use crate::rules::{DeserializationContext, Rule};
use crate::store::{MemoryStore, Store};

/// Contents of a fixture file.
///
/// ```json
/// {
///   "org": {"id": 1, "name": "UNICEF"},
///   "groups": [..], "labels": [..], "messages": [..],
///   "rules": [{"tests": [..], "actions": [..]}]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub org: Org,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Serialized rules, resolved against the store by [`Fixture::build_rules`].
    #[serde(default)]
    pub rules: Vec<Value>,
}

impl Fixture {
    /// Read and parse a fixture file.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path).await?;
        let fixture = Self::parse(&text)?;
        info!(
            path = %path.display(),
            labels = fixture.labels.len(),
            messages = fixture.messages.len(),
            rules = fixture.rules.len(),
            "Loaded fixture"
        );
        Ok(fixture)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// A store holding the fixture's groups, labels and messages.
    pub async fn to_store(&self) -> MemoryStore {
        let store = MemoryStore::new();
        for group in &self.groups {
            store.insert_group(group.clone()).await;
        }
        for label in &self.labels {
            store.insert_label(label.clone()).await;
        }
        for message in &self.messages {
            store.insert_message(message.clone()).await;
        }
        store
    }

    /// Resolve the fixture's rules, followed by one keyword rule per org
    /// label with keywords when `label_rules` is set.
    pub async fn build_rules(&self, store: &dyn Store, label_rules: bool) -> error::Result<Vec<Rule>> {
        let ctx = DeserializationContext::new(&self.org, store);

        let mut rules = Vec::with_capacity(self.rules.len());
        for value in &self.rules {
            rules.push(Rule::from_json(value, &ctx).await?);
        }

        if label_rules {
            for label in store.get_labels(&self.org).await? {
                if label.keywords.is_empty() {
                    continue;
                }
                debug!(label = %label.name, keywords = label.keywords.len(), "Keyword rule");
                rules.push(Rule::from_label(&label)?);
            }
        }

        Ok(rules)
    }
}
