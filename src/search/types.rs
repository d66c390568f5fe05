use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One item returned by the search backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(rename = "publishedDate", skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engines: Option<Vec<String>>,
    /// Which variant query produced this item. Stamped by the merger.
    #[serde(rename = "fromQuery", skip_serializing_if = "Option::is_none")]
    pub from_query: Option<String>,
}

impl SearchItem {
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// A (possibly merged) result set for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSet {
    pub query: String,
    pub results: Vec<SearchItem>,
    pub number_of_results: usize,
}

impl ResultSet {
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            results: Vec::new(),
            number_of_results: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Shapes the search backend has been observed to return. SearXNG instances
/// differ by version and configuration: some return the documented object,
/// some a bare result array, some only `answers` or `suggestions`.
#[derive(Debug)]
pub enum ResponseShape {
    WellFormed {
        results: Vec<SearchItem>,
        number_of_results: Option<usize>,
    },
    BareArray(Vec<SearchItem>),
    AnswersOnly(Vec<SearchItem>),
    SuggestionsOnly(Vec<String>),
    Empty,
}

/// Classifies a raw JSON body into one of the known shapes.
pub fn classify_response(raw: &Value) -> ResponseShape {
    if let Value::Array(items) = raw {
        return ResponseShape::BareArray(parse_items(items));
    }

    let Value::Object(map) = raw else {
        return ResponseShape::Empty;
    };

    if let Some(Value::Array(items)) = map.get("results")
        && !items.is_empty()
    {
        return ResponseShape::WellFormed {
            results: parse_items(items),
            number_of_results: map.get("number_of_results").and_then(Value::as_u64).map(|n| n as usize),
        };
    }

    if let Some(Value::Array(answers)) = map.get("answers")
        && !answers.is_empty()
    {
        return ResponseShape::AnswersOnly(answers.iter().filter_map(synthesize_answer).collect());
    }

    if let Some(Value::Array(suggestions)) = map.get("suggestions")
        && !suggestions.is_empty()
    {
        let texts = suggestions
            .iter()
            .filter_map(|s| s.as_str().map(str::to_string))
            .collect();
        return ResponseShape::SuggestionsOnly(texts);
    }

    ResponseShape::Empty
}

impl ResponseShape {
    /// Adapts any shape to the canonical result set for `query`.
    pub fn into_result_set(self, query: &str) -> ResultSet {
        match self {
            ResponseShape::WellFormed {
                results,
                number_of_results,
            } => {
                let count = number_of_results.unwrap_or(results.len());
                ResultSet {
                    query: query.to_string(),
                    number_of_results: count,
                    results,
                }
            }
            ResponseShape::BareArray(results) | ResponseShape::AnswersOnly(results) => ResultSet {
                query: query.to_string(),
                number_of_results: results.len(),
                results,
            },
            ResponseShape::SuggestionsOnly(texts) => {
                let results: Vec<SearchItem> = texts
                    .into_iter()
                    .map(|text| SearchItem {
                        title: text,
                        ..SearchItem::default()
                    })
                    .collect();
                ResultSet {
                    query: query.to_string(),
                    number_of_results: results.len(),
                    results,
                }
            }
            ResponseShape::Empty => ResultSet::empty(query),
        }
    }
}

fn parse_items(items: &[Value]) -> Vec<SearchItem> {
    items
        .iter()
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect()
}

/// Older SearXNG versions return answers as plain strings, newer ones as
/// `{answer, url}` objects.
fn synthesize_answer(value: &Value) -> Option<SearchItem> {
    match value {
        Value::String(text) => Some(SearchItem {
            title: text.clone(),
            content: text.clone(),
            ..SearchItem::default()
        }),
        Value::Object(map) => {
            let text = map.get("answer").and_then(Value::as_str)?;
            Some(SearchItem {
                title: text.to_string(),
                content: text.to_string(),
                url: map
                    .get("url")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                ..SearchItem::default()
            })
        }
        _ => None,
    }
}
