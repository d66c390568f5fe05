use std::collections::HashSet;

use futures::future::join_all;
use tracing::{info, warn};

use super::client::SearchBackend;
use super::expand::expand_query;
use super::types::ResultSet;

/// Each variant fetches few results; the merge step removes the overlap.
const PER_VARIANT_RESULTS: usize = 5;

/// Runs one search per variant concurrently and waits for all of them.
/// A failed variant degrades to `None`; the output is index-aligned with
/// `variants`.
pub async fn execute_variants(
    backend: &impl SearchBackend,
    variants: &[String],
) -> Vec<Option<ResultSet>> {
    let futures = variants.iter().map(|variant| async move {
        match backend.search(variant, PER_VARIANT_RESULTS).await {
            Ok(set) => Some(set),
            Err(e) => {
                warn!(query = %variant, error = %e, "variant search failed");
                None
            }
        }
    });
    join_all(futures).await
}

/// Merges per-variant outcomes into one deduplicated, ranked result set.
///
/// Dedup is first-seen-wins keyed by URL in variant order; items with an
/// empty URL are dropped. Surviving items are stamped with the variant that
/// produced them and stable-sorted by descending score.
pub fn merge_results(
    variants: &[String],
    outcomes: Vec<Option<ResultSet>>,
    primary: &str,
) -> ResultSet {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    let mut total = 0;

    for (variant, outcome) in variants.iter().zip(outcomes) {
        let Some(set) = outcome else { continue };
        if set.results.is_empty() {
            continue;
        }

        total += set.results.len();
        for mut item in set.results {
            if item.url.is_empty() || !seen.insert(item.url.clone()) {
                continue;
            }
            item.from_query = Some(variant.clone());
            merged.push(item);
        }
    }

    merged.sort_by(|a, b| b.score_or_zero().total_cmp(&a.score_or_zero()));
    info!(total, unique = merged.len(), "merged fan-out search results");

    ResultSet {
        query: primary.to_string(),
        number_of_results: merged.len(),
        results: merged,
    }
}

/// Full enhanced search: expand the query, fan out, merge. Never fails — a
/// total search outage yields an empty result set.
pub async fn enhanced_search(backend: &impl SearchBackend, query: &str) -> ResultSet {
    let variants = expand_query(query);
    info!(count = variants.len(), query, "executing fan-out search");

    let outcomes = execute_variants(backend, &variants).await;
    merge_results(&variants, outcomes, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::client::SearchError;
    use crate::search::types::SearchItem;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct MockBackend {
        responses: Mutex<VecDeque<Result<ResultSet, SearchError>>>,
        queries: Mutex<Vec<String>>,
    }

    impl MockBackend {
        fn scripted(responses: Vec<Result<ResultSet, SearchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn captured_queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl SearchBackend for MockBackend {
        async fn search(&self, query: &str, _limit: usize) -> Result<ResultSet, SearchError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(SearchError::Status(503)))
        }
    }

    fn item(url: &str, score: Option<f64>) -> SearchItem {
        SearchItem {
            title: url.to_string(),
            url: url.to_string(),
            content: "text".to_string(),
            score,
            ..SearchItem::default()
        }
    }

    fn set(query: &str, items: Vec<SearchItem>) -> ResultSet {
        ResultSet {
            query: query.to_string(),
            number_of_results: items.len(),
            results: items,
        }
    }

    fn variants(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn merge_dedups_by_url_first_seen_wins() {
        let vs = variants(&["v0", "v1"]);
        let outcomes = vec![
            Some(set("v0", vec![item("https://a.com", Some(1.0))])),
            Some(set(
                "v1",
                vec![item("https://a.com", Some(9.0)), item("https://b.com", None)],
            )),
        ];

        let merged = merge_results(&vs, outcomes, "v0");

        assert_eq!(merged.results.len(), 2);
        let a = merged.results.iter().find(|i| i.url == "https://a.com").unwrap();
        // the duplicate from v1 (score 9.0) was dropped, not the v0 original
        assert_eq!(a.score, Some(1.0));
        assert_eq!(a.from_query.as_deref(), Some("v0"));
    }

    #[test]
    fn merge_stamps_originating_variant() {
        let vs = variants(&["primary", "primary 背景"]);
        let outcomes = vec![
            Some(set("primary", vec![item("https://a.com", None)])),
            Some(set("primary 背景", vec![item("https://b.com", None)])),
        ];

        let merged = merge_results(&vs, outcomes, "primary");

        assert_eq!(merged.results[0].from_query.as_deref(), Some("primary"));
        assert_eq!(merged.results[1].from_query.as_deref(), Some("primary 背景"));
    }

    #[test]
    fn merge_sorts_descending_by_score_with_stable_ties() {
        let vs = variants(&["v0"]);
        let outcomes = vec![Some(set(
            "v0",
            vec![
                item("https://low.com", Some(0.5)),
                item("https://tie-1.com", None),
                item("https://high.com", Some(3.0)),
                item("https://tie-2.com", Some(0.0)),
            ],
        ))];

        let merged = merge_results(&vs, outcomes, "v0");
        let urls: Vec<&str> = merged.results.iter().map(|i| i.url.as_str()).collect();

        // missing score ranks as 0.0; equal keys keep their pre-sort order
        assert_eq!(
            urls,
            vec![
                "https://high.com",
                "https://low.com",
                "https://tie-1.com",
                "https://tie-2.com"
            ]
        );
    }

    #[test]
    fn merge_drops_items_without_url() {
        let vs = variants(&["v0"]);
        let outcomes = vec![Some(set(
            "v0",
            vec![item("", Some(5.0)), item("https://a.com", None)],
        ))];

        let merged = merge_results(&vs, outcomes, "v0");

        assert_eq!(merged.results.len(), 1);
        assert_eq!(merged.results[0].url, "https://a.com");
    }

    #[test]
    fn merge_of_nothing_is_empty_not_an_error() {
        let merged = merge_results(&variants(&["v0", "v1"]), vec![None, None], "v0");

        assert_eq!(merged.query, "v0");
        assert!(merged.results.is_empty());
        assert_eq!(merged.number_of_results, 0);
    }

    #[test]
    fn merge_count_matches_survivors() {
        let vs = variants(&["v0", "v1"]);
        let outcomes = vec![
            Some(set(
                "v0",
                vec![item("https://a.com", None), item("https://b.com", None)],
            )),
            Some(set(
                "v1",
                vec![item("https://b.com", None), item("https://c.com", None)],
            )),
        ];

        let merged = merge_results(&vs, outcomes, "v0");
        assert_eq!(merged.number_of_results, merged.results.len());
        assert_eq!(merged.number_of_results, 3);
    }

    #[tokio::test]
    async fn executor_degrades_failed_variants_to_none() {
        let backend = MockBackend::scripted(vec![
            Ok(set("a", vec![item("https://a.com", None)])),
            Err(SearchError::Status(500)),
            Ok(set("c", vec![item("https://c.com", None)])),
        ]);
        let vs = variants(&["a", "b", "c"]);

        let outcomes = execute_variants(&backend, &vs).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_some());
        assert!(outcomes[1].is_none());
        assert!(outcomes[2].is_some());
    }

    #[tokio::test]
    async fn enhanced_search_queries_every_variant() {
        let expected = expand_query("俄乌冲突").len();
        let backend =
            MockBackend::scripted((0..expected).map(|_| Ok(set("q", vec![]))).collect());

        let merged = enhanced_search(&backend, "俄乌冲突").await;

        assert_eq!(backend.captured_queries().len(), expected);
        assert_eq!(backend.captured_queries()[0], "俄乌冲突");
        assert!(merged.is_empty());
    }

    #[tokio::test]
    async fn enhanced_search_survives_total_outage() {
        let backend = MockBackend::scripted(vec![]);

        let merged = enhanced_search(&backend, "test").await;

        assert_eq!(merged.query, "test");
        assert!(merged.is_empty());
    }
}
