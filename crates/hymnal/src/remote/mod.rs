//! Remote document stores.

mod memory;
mod rest;
mod tree;

pub use memory::InMemoryDocumentStore;
pub use rest::{resource_url, RestDocumentStore, DEFAULT_MAX_RETRIES};
