//! Batch processor: evaluate rules over many messages, then apply each
//! distinct action once to everything it collected.
//!
//! Lifecycle is `new` → `include`* → `apply`. `apply` consumes the
//! processor, so it cannot be reused afterwards.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use super::action::Action;
use super::rule::Rule;
use crate::backend::Backend;
use crate::error;
use crate::model::{Message, MessageId, Org};
use crate::store::Store;

/// Counts returned by [`BatchProcessor::include`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    /// Rule/message pairs that matched.
    pub rules_matched: usize,
    /// Action firings recorded, one per action of each matching rule. Not
    /// reduced by message deduplication.
    pub actions_deferred: usize,
}

impl std::ops::AddAssign for BatchCounts {
    fn add_assign(&mut self, other: Self) {
        self.rules_matched += other.rules_matched;
        self.actions_deferred += other.actions_deferred;
    }
}

/// Request-scoped processor for one batch of messages.
///
/// Not synchronized: `include` takes `&mut self`, so concurrent callers
/// need their own processor.
pub struct BatchProcessor<'a> {
    org: &'a Org,
    rules: &'a [Rule],
    /// Pending messages per action, deduplicated by message id.
    messages_by_action: HashMap<&'a Action, BTreeMap<MessageId, &'a Message>>,
    /// Distinct actions in the order they first fired.
    order: Vec<&'a Action>,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(org: &'a Org, rules: &'a [Rule]) -> Self {
        Self {
            org,
            rules,
            messages_by_action: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Evaluate every rule against every message, deferring the actions of
    /// matching rules.
    ///
    /// Messages of another org are skipped. Counts are for this call only;
    /// pending actions accumulate across calls.
    pub fn include<I>(&mut self, messages: I) -> BatchCounts
    where
        I: IntoIterator<Item = &'a Message>,
    {
        let rules = self.rules;
        let mut counts = BatchCounts::default();

        for message in messages {
            if message.org_id != self.org.id {
                debug!(
                    message = message.id,
                    message_org = message.org_id,
                    org = self.org.id,
                    "Skipping message of another org"
                );
                continue;
            }

            for (index, rule) in rules.iter().enumerate() {
                if !rule.matches(message) {
                    continue;
                }
                counts.rules_matched += 1;
                debug!(message = message.id, rule = index, "Rule matched");

                for action in &rule.actions {
                    let pending = self.messages_by_action.entry(action).or_insert_with(|| {
                        self.order.push(action);
                        BTreeMap::new()
                    });
                    pending.entry(message.id).or_insert(message);
                    counts.actions_deferred += 1;
                }
            }
        }

        counts
    }

    /// Distinct actions waiting to be applied, in the order they first fired.
    pub fn pending_actions(&self) -> impl Iterator<Item = &'a Action> + '_ {
        self.order.iter().copied()
    }

    /// Messages pending for `action`, ordered by id.
    pub fn pending_messages(&self, action: &Action) -> Vec<&'a Message> {
        self.messages_by_action
            .get(action)
            .map(|messages| messages.values().copied().collect())
            .unwrap_or_default()
    }

    /// Apply each pending action once to its full message set.
    ///
    /// Stops at the first failing action; actions already applied stay
    /// applied. Returns the number of actions applied.
    pub async fn apply(self, store: &dyn Store, backend: &dyn Backend) -> error::Result<usize> {
        let mut applied = 0;

        for action in &self.order {
            let messages: Vec<&Message> = self
                .messages_by_action
                .get(*action)
                .map(|messages| messages.values().copied().collect())
                .unwrap_or_default();

            action.apply_to(self.org, &messages, store, backend).await?;
            applied += 1;
            info!(action = %action, messages = messages.len(), "Applied action");
        }

        info!(org = self.org.id, actions = applied, "Batch applied");
        Ok(applied)
    }
}
