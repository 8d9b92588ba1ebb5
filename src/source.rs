//! Query endpoint client.
//!
//! The poll loop consumes results through the [`ResultSource`] trait so the
//! endpoint stays an opaque, possibly slow, paginated data source — and so
//! tests can substitute scripted sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use uuid::Uuid;

use crate::error::FetchError;
use crate::models::{Query, ResultPage};

/// A paginated source of search results.
#[async_trait]
pub trait ResultSource: Send + Sync {
    /// Fetch the next slice of results: `count` results starting at
    /// offset `start`.
    async fn fetch_page(
        &self,
        query: &Query,
        start: usize,
        count: usize,
    ) -> Result<ResultPage, FetchError>;
}

/// How a session addresses the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// `GET /query?tab=..&query=..&start=..&count=..`
    Offset,
    /// `GET /query?id=..&from=..` against a server-held session.
    Session(Uuid),
}

/// HTTP implementation of [`ResultSource`] over the `/query` endpoint.
#[derive(Debug, Clone)]
pub struct HttpResultSource {
    client: Client,
    endpoint: String,
    addressing: Addressing,
}

impl HttpResultSource {
    /// Create a client against an endpoint base URL.
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            addressing: Addressing::Offset,
        }
    }

    /// Switch to session addressing against a server-held session id.
    pub fn with_session(mut self, id: Uuid) -> Self {
        self.addressing = Addressing::Session(id);
        self
    }

    pub fn addressing(&self) -> Addressing {
        self.addressing
    }
}

#[async_trait]
impl ResultSource for HttpResultSource {
    async fn fetch_page(
        &self,
        query: &Query,
        start: usize,
        count: usize,
    ) -> Result<ResultPage, FetchError> {
        let url = format!("{}/query", self.endpoint);
        let request = match self.addressing {
            Addressing::Offset => self.client.get(&url).query(&[
                ("tab", query.domain.as_tab().to_string()),
                ("query", query.text.clone()),
                ("start", start.to_string()),
                ("count", count.to_string()),
            ]),
            Addressing::Session(id) => self
                .client
                .get(&url)
                .query(&[("id", id.to_string()), ("from", start.to_string())]),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        let page = ResultPage::decode(value)?;
        debug!(
            start,
            batch = page.results.len(),
            has_more = page.has_more,
            "fetched result page"
        );
        Ok(page)
    }
}
