//! Fetches a result URL and reduces the page to readable plain text so a
//! cited article can be skimmed from the terminal.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

const MAX_RESPONSE_BYTES: usize = 10_000_000;
const MAX_TEXT_CHARS: usize = 5000;
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: must be HTTP(S)")]
    InvalidScheme,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("fetch failed: status {0}")]
    Status(u16),

    #[error("response too large (>{} bytes)", MAX_RESPONSE_BYTES)]
    TooLarge,
}

/// Downloads `url` and returns its visible text, truncated to
/// `MAX_TEXT_CHARS` characters.
pub async fn fetch_page_text(client: &Client, url: &str) -> Result<String, FetchError> {
    validate_url(url)?;

    let response = client
        .get(url)
        .header("User-Agent", crate::USER_AGENT)
        .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    if let Some(len) = response.content_length()
        && len as usize > MAX_RESPONSE_BYTES
    {
        return Err(FetchError::TooLarge);
    }

    let mut body = Vec::new();
    let mut stream = response;
    while let Some(chunk) = stream.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_RESPONSE_BYTES {
            return Err(FetchError::TooLarge);
        }
    }
    let html = String::from_utf8_lossy(&body);

    debug!(url, bytes = html.len(), "page fetched");
    Ok(truncate_chars(&strip_tags(&html), MAX_TEXT_CHARS))
}

fn validate_url(raw: &str) -> Result<(), FetchError> {
    let parsed = url::Url::parse(raw)?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(FetchError::InvalidScheme),
    }
}

/// Drops `<script>`/`<style>` elements wholesale, strips remaining tags, and
/// collapses whitespace.
fn strip_tags(html: &str) -> String {
    let without_scripts = remove_element(html, "script");
    let without_styles = remove_element(&without_scripts, "style");

    let mut text = String::with_capacity(without_styles.len() / 2);
    let mut in_tag = false;
    for c in without_styles.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes `<name ...>...</name>` elements, case-insensitively. Unclosed
/// elements are dropped to end of input.
fn remove_element(html: &str, name: &str) -> String {
    let open = format!("<{name}");
    let close = format!("</{name}>");
    // ASCII-only lowering keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();

    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    while let Some(pos) = lower[cursor..].find(&open) {
        let start = cursor + pos;
        out.push_str(&html[cursor..start]);
        match lower[start..].find(&close) {
            Some(end) => cursor = start + end + close.len(),
            None => return out,
        }
    }
    out.push_str(&html[cursor..]);
    out
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_and_strips_a_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>article text</p></body></html>"),
            )
            .mount(&server)
            .await;

        let text = fetch_page_text(&Client::new(), &format!("{}/article", server.uri()))
            .await
            .unwrap();

        assert_eq!(text, "article text");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetch_page_text(&Client::new(), &format!("{}/missing", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status(404)));
    }
}
