//! Document fetching: download a source URL and reduce it to plain text.

use async_trait::async_trait;
use ltipp_core::{AppError, AppResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;

const USER_AGENT: &str = concat!("ltipp-assistant/", env!("CARGO_PKG_VERSION"));

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg"];

/// Retrieves the text of one document.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch `url` and return its readable text.
    ///
    /// # Errors
    /// Returns `AppError::Fetch` for network failures, timeouts and non-2xx responses.
    async fn fetch(&self, url: &str) -> AppResult<String>;
}

/// HTTP fetcher backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Fetch(format!("Timed out fetching {}", url))
            } else {
                AppError::Fetch(format!("Failed to fetch {}: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("{} returned {}", url, status)));
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("html"))
            .unwrap_or(false);

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to read body of {}: {}", url, e)))?;

        tracing::debug!(url, bytes = body.len(), is_html, "Fetched document");

        if is_html || looks_like_html(&body) {
            Ok(html_to_text(&body))
        } else {
            Ok(body)
        }
    }
}

fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start();
    let prefix: String = head.chars().take(15).collect::<String>().to_ascii_lowercase();
    prefix.starts_with("<!doctype html") || prefix.starts_with("<html")
}

/// Visible text of an HTML document, one text run per line.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| HIDDEN_ELEMENTS.contains(&element.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }

        let line = collapse_whitespace(text);
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_drops_scripts_and_styles() {
        let html = r#"<!DOCTYPE html>
            <html>
              <head>
                <title>LTIPP Report</title>
                <style>body { color: red; }</style>
                <script>var tracking = true;</script>
              </head>
              <body>
                <h1>Lido</h1>
                <p>Incentives   were
                   distributed over 12 weeks.</p>
                <noscript>Enable JavaScript</noscript>
              </body>
            </html>"#;

        let text = html_to_text(html);

        assert_eq!(
            text,
            "LTIPP Report\nLido\nIncentives were distributed over 12 weeks."
        );
    }

    #[test]
    fn test_html_to_text_empty_document() {
        assert_eq!(html_to_text("<html><body>   </body></html>"), "");
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("  <!DOCTYPE html><html></html>"));
        assert!(looks_like_html("<HTML><body>x</body></HTML>"));
        assert!(!looks_like_html("plain text about <b>tags</b>"));
        assert!(!looks_like_html("{\"json\": true}"));
    }

    #[tokio::test]
    async fn test_unreachable_url_is_fetch_error() {
        let fetcher = HttpFetcher::new(Duration::from_millis(500)).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/doc").await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
        assert!(err.is_transport());
    }
}
