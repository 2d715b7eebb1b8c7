//! What serialized tests and actions are resolved against.

use serde_json::Value;

use crate::error::RuleError;
use crate::model::Org;
use crate::store::Store;

/// Owning org plus the store its group and label references resolve in.
#[derive(Clone, Copy)]
pub struct DeserializationContext<'a> {
    pub org: &'a Org,
    pub store: &'a dyn Store,
}

impl<'a> DeserializationContext<'a> {
    pub fn new(org: &'a Org, store: &'a dyn Store) -> Self {
        Self { org, store }
    }
}

/// The `type` discriminator of a serialized test or action.
pub(crate) fn discriminator<'v>(value: &'v Value, kind: &'static str) -> Result<&'v str, RuleError> {
    value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(RuleError::MissingType { kind })
}
