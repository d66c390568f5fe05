//! Search orchestration: query expansion, SearXNG fan-out, merge, and
//! prompt-context formatting.

pub(crate) mod client;
pub(crate) mod context;
pub(crate) mod engine;
pub(crate) mod expand;
pub(crate) mod types;

pub use client::{SearchBackend, SearxngClient};
pub use types::ResultSet;
