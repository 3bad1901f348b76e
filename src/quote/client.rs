//! HTTP client for the quotable-style quote provider

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{random_url, search_url, Quote, QuoteError, QuoteSource, SearchResults};

const USER_AGENT: &str = concat!("quoteline/", env!("CARGO_PKG_VERSION"));

pub struct HttpQuoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuoteSource {
    /// `timeout` of `None` leaves requests unbounded
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, QuoteError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, QuoteError> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| QuoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn random(&self, tags: &[String]) -> Result<Quote, QuoteError> {
        self.get_json(&random_url(&self.base_url, tags)).await
    }

    async fn search(&self, term: &str) -> Result<SearchResults, QuoteError> {
        self.get_json(&search_url(&self.base_url, term)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one HTTP response on a local port, returning the base URL
    /// and a handle resolving to the raw request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            request.lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn test_random_success() {
        let (base, server) = serve_once("200 OK", r#"{"content":"Dream big.","author":"Someone"}"#).await;
        let source = HttpQuoteSource::new(base, None).unwrap();
        let tags = vec!["motivational".to_string(), "inspirational".to_string()];

        let quote = source.random(&tags).await.unwrap();
        assert_eq!(quote, Quote::new("Dream big.", "Someone"));

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /random?tags=motivational|inspirational"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_status_error() {
        let (base, _server) = serve_once("503 Service Unavailable", "{}").await;
        let source = HttpQuoteSource::new(base, None).unwrap();

        match source.random(&[]).await {
            Err(QuoteError::Status(503)) => {}
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let (base, _server) = serve_once("200 OK", "not json").await;
        let source = HttpQuoteSource::new(base, None).unwrap();

        assert!(matches!(source.search("life").await, Err(QuoteError::Decode(_))));
    }

    #[tokio::test]
    async fn test_search_sends_term_in_query() {
        let (base, server) = serve_once("200 OK", r#"{"count":0,"results":[]}"#).await;
        let source = HttpQuoteSource::new(base, None).unwrap();

        let results = source.search("life").await.unwrap();
        assert!(matches!(results.first(), Ok(None)));

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /search/quotes?query=life "));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind and drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpQuoteSource::new(format!("http://{}", addr), Some(Duration::from_secs(2))).unwrap();
        assert!(matches!(source.random(&[]).await, Err(QuoteError::Transport(_))));
    }
}
