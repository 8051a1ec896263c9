//! REST client for the helpdesk API.
//!
//! Every request carries the `auth_token` and `per_page` query parameters
//! and is bounded by the configured timeout. Any status other than 200,
//! empty 2xx answers included, is a hard failure for that call, surfaced
//! as `Error::Api` with the status and the response body. No call is
//! retried.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// One page of a paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// 1-based page number as reported by the server.
    pub page: u32,
    pub total_pages: u32,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Whether the server reported this as the final page.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }
}

/// Wire shape of `GET /tickets`.
#[derive(Debug, Deserialize)]
struct TicketsResponse {
    current_page: u32,
    total_pages: u32,
    #[serde(default)]
    tickets: Vec<Value>,
}

/// Authenticated client for one helpdesk account.
///
/// Cheap to clone: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    per_page: u32,
}

impl ApiClient {
    /// Build a client from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` if the TLS backend cannot be initialised.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("hdx/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            token: config.token.clone(),
            per_page: config.per_page,
        })
    }

    /// Page size used for listings.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// GET `endpoint` with the common parameters plus `params`.
    async fn get_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{endpoint}", self.base_url);
        let per_page = self.per_page.to_string();
        debug!(endpoint, ?params, "GET");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .query(&[
                ("auth_token", self.token.as_str()),
                ("per_page", per_page.as_str()),
            ])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// GET `endpoint` and pull the list stored under `key`.
    async fn get_list(
        &self,
        endpoint: &str,
        key: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Value>> {
        let mut data: Value = self.get_data(endpoint, params).await?;
        match data.get_mut(key).map(Value::take) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(Error::Other(format!(
                "Response from {endpoint} has no \"{key}\" list"
            ))),
        }
    }

    /// All users, including invited ones.
    pub async fn users(&self) -> Result<Vec<Value>> {
        self.get_list("/users", "users", &[("with_invited", "true".into())])
            .await
    }

    pub async fn labels(&self) -> Result<Vec<Value>> {
        self.get_list("/labels", "labels", &[]).await
    }

    pub async fn teams(&self) -> Result<Vec<Value>> {
        self.get_list("/teams", "teams", &[]).await
    }

    pub async fn snippets(&self) -> Result<Vec<Value>> {
        self.get_list("/snippets", "snippets", &[]).await
    }

    /// Forwarding addresses of the account.
    pub async fn emails(&self) -> Result<Vec<Value>> {
        self.get_list("/emails", "forwarding_addresses", &[]).await
    }

    /// Fetch one page of tickets, archived ones included.
    ///
    /// `since` is passed through to the server as-is; the exporter does
    /// not filter listings itself.
    pub async fn tickets_page(
        &self,
        page: u32,
        since: Option<DateTime<Utc>>,
    ) -> Result<Page<Value>> {
        let mut params = vec![("page", page.to_string()), ("archived", "true".into())];
        if let Some(since) = since {
            params.push(("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }

        let response: TicketsResponse = self.get_data("/tickets", &params).await?;
        Ok(Page {
            page: response.current_page,
            total_pages: response.total_pages,
            items: response.tickets,
        })
    }

    pub async fn replies(&self, ticket_id: u64) -> Result<Vec<Value>> {
        self.get_list(&format!("/tickets/{ticket_id}/replies"), "replies", &[])
            .await
    }

    pub async fn comments(&self, ticket_id: u64) -> Result<Vec<Value>> {
        self.get_list(&format!("/tickets/{ticket_id}/comments"), "comments", &[])
            .await
    }

    /// Download an attachment body.
    ///
    /// The locator is used verbatim with the auth token appended as a
    /// query parameter.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .query(&[("auth_token", self.token.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                endpoint: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
