//! OpenAI-compatible chat-completion client and the prompts that drive
//! timeline synthesis.

pub(crate) mod client;
pub(crate) mod prompts;
pub(crate) mod types;

pub use client::{ChatClient, LlmClient, LlmError};
pub use types::ChatMessage;
