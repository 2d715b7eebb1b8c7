//! Inbox rules: classify incoming messages with keyword, group and field
//! rules, then label, flag or archive them in batches.

pub mod backend;
pub mod config;
pub mod error;
pub mod fixture;
pub mod model;
pub mod rules;
pub mod store;
