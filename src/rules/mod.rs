//! Rules engine: tests, actions, rules and the batch processor that
//! applies them.
//!
//! Flow:
//! 1. Rules are built from JSON (or from label keywords) against a
//!    [`DeserializationContext`]
//! 2. A [`BatchProcessor`] evaluates every rule against every included
//!    message and groups the resulting actions
//! 3. `apply` runs each distinct action once over its messages

pub mod action;
pub mod batch;
pub mod context;
pub mod normalize;
pub mod quantifier;
pub mod rule;

pub use action::Action;
pub use batch::{BatchCounts, BatchProcessor};
pub use context::DeserializationContext;
pub use normalize::normalize;
pub use quantifier::Quantifier;
pub use rule::Rule;
pub use test::{ContainsTest, FieldTest, GroupsTest, Test};
