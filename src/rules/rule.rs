//! A rule binds a conjunction of tests to the actions taken on a match.

use serde::Deserialize;
use serde_json::{Value, json};

use super::action::Action;
use super::context::DeserializationContext;
use super::quantifier::Quantifier;
use super::test::{ContainsTest, Test};
use crate::error::{self, RuleError};
use crate::model::{Label, Message};

/// Tests that must all match, and the actions to perform when they do.
///
/// Rules are derived on the fly (e.g. from label keywords) rather than
/// stored. A rule with no tests matches every message.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub tests: Vec<Test>,
    pub actions: Vec<Action>,
}

#[derive(Deserialize)]
struct RuleSpec {
    #[serde(default)]
    tests: Vec<Value>,
    #[serde(default)]
    actions: Vec<Value>,
}

impl Rule {
    pub fn new(tests: Vec<Test>, actions: Vec<Action>) -> Self {
        Self { tests, actions }
    }

    /// Rule that applies `label` to messages containing any of its keywords.
    pub fn from_label(label: &Label) -> Result<Self, RuleError> {
        let test = ContainsTest::new(&label.keywords, Quantifier::Any)?;
        Ok(Self::new(
            vec![Test::Contains(test)],
            vec![Action::Label(label.clone())],
        ))
    }

    /// Whether every test matches, checked in order.
    pub fn matches(&self, message: &Message) -> bool {
        self.tests.iter().all(|test| test.matches(message))
    }

    pub fn to_json(&self) -> Value {
        json!({
            "tests": self.tests.iter().map(Test::to_json).collect::<Vec<_>>(),
            "actions": self.actions.iter().map(Action::to_json).collect::<Vec<_>>(),
        })
    }

    /// Build a rule from `{"tests": [..], "actions": [..]}`.
    pub async fn from_json(
        value: &Value,
        ctx: &DeserializationContext<'_>,
    ) -> error::Result<Self> {
        let spec: RuleSpec = serde_json::from_value(value.clone()).map_err(RuleError::from)?;

        let mut tests = Vec::with_capacity(spec.tests.len());
        for test in &spec.tests {
            tests.push(Test::from_json(test, ctx).await?);
        }

        let mut actions = Vec::with_capacity(spec.actions.len());
        for action in &spec.actions {
            actions.push(Action::from_json(action, ctx).await?);
        }

        Ok(Self::new(tests, actions))
    }
}
