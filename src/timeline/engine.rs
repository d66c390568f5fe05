//! End-to-end pipeline: fan-out search, context injection, chat call, parse.
//!
//! Search degradation is silent (the model still gets a context message, even
//! if it is just the no-results note); a chat failure is a hard error because
//! there is no substitute content source.

use tracing::info;

use super::parser::parse_timeline;
use super::types::TimelineData;
use crate::llm::client::{ChatClient, LlmError};
use crate::llm::prompts;
use crate::llm::types::ChatMessage;
use crate::search::client::SearchBackend;
use crate::search::context::format_search_context;
use crate::search::engine::enhanced_search;

pub async fn generate_timeline(
    search: Option<&impl SearchBackend>,
    llm: &impl ChatClient,
    query: &str,
) -> Result<TimelineData, LlmError> {
    let messages = assemble_messages(
        search,
        prompts::TIMELINE_SYSTEM_PROMPT,
        prompts::timeline_user_prompt(query),
        query,
    )
    .await;

    let text = llm.complete(messages).await?;
    let data = parse_timeline(&text);
    info!(events = data.events.len(), "timeline generated");
    Ok(data)
}

/// Detailed analysis of a single event. The model's markdown reply is
/// returned verbatim.
pub async fn event_details(
    search: Option<&impl SearchBackend>,
    llm: &impl ChatClient,
    query: &str,
) -> Result<String, LlmError> {
    let messages = assemble_messages(
        search,
        prompts::EVENT_DETAILS_SYSTEM_PROMPT,
        prompts::event_details_user_prompt(query),
        query,
    )
    .await;

    llm.complete(messages).await
}

async fn assemble_messages(
    search: Option<&impl SearchBackend>,
    system_prompt: &str,
    user_prompt: String,
    query: &str,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt)];

    if let Some(backend) = search {
        let results = enhanced_search(backend, query).await;
        info!(results = results.number_of_results, query, "search context gathered");
        messages.push(ChatMessage::system(format_search_context(&results)));
    }

    messages.push(ChatMessage::user(user_prompt));
    messages
}
