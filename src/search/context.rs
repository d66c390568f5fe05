//! Renders a merged result set into the text block injected into the LLM
//! prompt as a system message.

use super::types::ResultSet;

/// Only the top of the ranking goes into the prompt; more adds noise and
/// burns context budget.
const MAX_CONTEXT_RESULTS: usize = 10;

pub const NO_RESULTS_NOTE: &str = "未找到相关搜索结果。";

/// Formats `set` for prompt injection. Deterministic for a given input
/// ordering; an empty set yields the fixed no-results sentence.
pub fn format_search_context(set: &ResultSet) -> String {
    if set.results.is_empty() {
        return NO_RESULTS_NOTE.to_string();
    }

    let mut text = format!("以下是与\"{}\"相关的最新搜索结果：\n\n", set.query);

    for (index, result) in set.results.iter().take(MAX_CONTEXT_RESULTS).enumerate() {
        match &result.from_query {
            Some(from) if *from != set.query => {
                text.push_str(&format!(
                    "[{}] {} (来自查询: \"{}\")\n",
                    index + 1,
                    result.title,
                    from
                ));
            }
            _ => text.push_str(&format!("[{}] {}\n", index + 1, result.title)),
        }

        text.push_str(&format!("来源: {}\n", result.url));

        if let Some(date) = &result.published_date {
            text.push_str(&format!("日期: {date}\n"));
        }
        if let Some(category) = &result.category {
            text.push_str(&format!("类别: {category}\n"));
        }
        if let Some(engine) = engine_names(result) {
            text.push_str(&format!("引擎: {engine}\n"));
        }

        text.push_str(&format!("摘要: {}\n\n", result.content));
    }

    text.push_str("请根据以上搜索结果和你已有的知识回答问题。特别是利用最新的事实和数据。为每个事件尽可能提供详细信息，包括：\n");
    text.push_str("1. 精确的日期（年月日）\n");
    text.push_str("2. 参与的人物及其角色\n");
    text.push_str("3. 详细的事件描述，包括原因、经过和结果\n");
    text.push_str("4. 可靠的信息来源\n");
    text.push_str("5. 相关的背景和影响\n");
    text.push_str("6. 尽可能分析不同来源信息的差异，整合最完整和准确的事实\n");

    text
}

fn engine_names(result: &super::types::SearchItem) -> Option<String> {
    if let Some(engine) = &result.engine {
        return Some(engine.clone());
    }
    result.engines.as_ref().map(|engines| engines.join(", "))
}
