//! Web operations collaborator: page fetch and DuckDuckGo search.
//!
//! Only the agent reaches these, as its `web_fetch` and `web_search` tools.
//! Failures come back as `{"error": "..."}` strings rather than `Err`, the
//! same convention as the rest of the agent's tool results.

use std::time::Duration;

use serde::Serialize;
use serde_json::json;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";
const DDG_LITE_URL: &str = "https://lite.duckduckgo.com/lite/";

/// A single search result with title, URL, and snippet.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

pub struct WebOperations {
    client: reqwest::Client,
}

impl WebOperations {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch `url`. HTML is converted to markdown when `format` is
    /// `"markdown"`; JSON and other bodies are returned as-is. `max_length`
    /// caps the returned text in characters.
    pub async fn fetch(&self, url: &str, format: &str, max_length: Option<usize>) -> String {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => return json!({"error": format!("web_fetch: {e}")}).to_string(),
        };

        let status = response.status();
        if !status.is_success() {
            return json!({"error": format!("web_fetch: HTTP {status}")}).to_string();
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                return json!({"error": format!("web_fetch: failed to read body: {e}")}).to_string();
            }
        };

        let output = if content_type.contains("text/html") && format == "markdown" {
            htmd::convert(&body).unwrap_or(body)
        } else {
            body
        };

        maybe_truncate(&output, max_length)
    }

    /// Search DuckDuckGo's lite endpoint and return up to `count` results as
    /// a JSON array.
    pub async fn search(&self, query: &str, count: usize) -> String {
        let resp = match self
            .client
            .get(DDG_LITE_URL)
            .query(&[("q", query)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return json!({"error": format!("web_search: DuckDuckGo request failed: {e}")})
                    .to_string();
            }
        };

        let html = match resp.text().await {
            Ok(t) => t,
            Err(e) => {
                return json!({"error": format!("web_search: failed to read response: {e}")})
                    .to_string();
            }
        };

        let results = parse_ddg_lite_html(&html, count);
        serde_json::to_string(&results).unwrap_or_else(|e| {
            json!({"error": format!("web_search: failed to serialize results: {e}")}).to_string()
        })
    }
}

/// Pull results out of the DDG lite table layout: `a.result-link` carries
/// title and URL, the n-th `td.result-snippet` carries the n-th snippet.
fn parse_ddg_lite_html(html: &str, count: usize) -> Vec<SearchResult> {
    use scraper::{Html, Selector};

    let document = Html::parse_document(html);
    let (Ok(link_selector), Ok(snippet_selector)) = (
        Selector::parse("a.result-link"),
        Selector::parse("td.result-snippet"),
    ) else {
        return Vec::new();
    };

    let snippets: Vec<String> = document
        .select(&snippet_selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect();

    document
        .select(&link_selector)
        .enumerate()
        .filter_map(|(i, link)| {
            let title = link.text().collect::<String>().trim().to_string();
            let url = link.value().attr("href").unwrap_or("").trim().to_string();
            if title.is_empty() || url.is_empty() {
                return None;
            }
            Some(SearchResult {
                title,
                url,
                snippet: snippets.get(i).cloned().unwrap_or_default(),
            })
        })
        .take(count)
        .collect()
}

/// Cut `content` to `max_length` characters, noting where and from how much.
fn maybe_truncate(content: &str, max_length: Option<usize>) -> String {
    let total = content.chars().count();
    match max_length {
        Some(limit) if total > limit => {
            let head: String = content.chars().take(limit).collect();
            format!("{head}...\n[truncated at {limit} chars, total {total}]")
        }
        _ => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_within_limit() {
        assert_eq!(maybe_truncate("hello world", Some(100)), "hello world");
    }

    #[test]
    fn truncate_at_limit() {
        let result = maybe_truncate("hello world", Some(5));
        assert!(result.starts_with("hello..."));
        assert!(result.contains("[truncated at 5 chars, total 11]"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let result = maybe_truncate("héllo wörld", Some(2));
        assert!(result.starts_with("hé..."));
    }

    #[test]
    fn truncate_none_returns_full() {
        assert_eq!(maybe_truncate("hello world", None), "hello world");
    }

    #[test]
    fn parses_ddg_lite_results() {
        let html = r#"
<html><body><table>
  <tr><td><a class="result-link" href="https://www.rust-lang.org/">Rust Programming Language</a></td></tr>
  <tr><td class="result-snippet">A language empowering everyone.</td></tr>
  <tr><td><a class="result-link" href="https://doc.rust-lang.org/book/">The Rust Book</a></td></tr>
  <tr><td class="result-snippet">An introductory book about Rust.</td></tr>
</table></body></html>"#;

        let results = parse_ddg_lite_html(html, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[1].snippet, "An introductory book about Rust.");
    }

    #[test]
    fn ddg_results_respect_count() {
        let html = r#"
<a class="result-link" href="https://a.example/">A</a>
<a class="result-link" href="https://b.example/">B</a>
<a class="result-link" href="https://c.example/">C</a>"#;

        let results = parse_ddg_lite_html(html, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "B");
        assert!(results[1].snippet.is_empty());
    }
}
