//! Message store: labels, groups and the messages actions mutate.

pub mod memory;
pub mod traits;

pub use memory::{MemoryStore, StoreEvent};
pub use traits::Store;
