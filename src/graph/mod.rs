pub mod application;
pub mod auth;

use crate::error::{Result, SetupError};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

pub const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Thin Graph API client for the provisioning steps.
///
/// Every call runs exactly once. Each mutation declares the exact status code
/// that counts as success for that step; any other status, including other
/// 2xx codes, aborts the whole run.
pub struct GraphClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GraphClient {
    pub fn new(access_token: String) -> Self {
        Self::with_base_url(GRAPH_API_BASE.to_string(), access_token)
    }

    /// Client with a custom base URL (used by tests)
    pub fn with_base_url(base_url: String, access_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            access_token,
        }
    }

    /// POST a JSON body and deserialize the response, requiring `expected`
    pub async fn post_json<B, R>(&self, endpoint: &str, body: &B, expected: StatusCode) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status != expected {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SetupError::GraphApi(format!(
                "HTTP {}: {}",
                status,
                crate::error::enhance_graph_error(&error_text)
            )));
        }

        Ok(response.json::<R>().await?)
    }

    /// PATCH a JSON body, requiring `expected` and discarding any response body
    pub async fn patch_expect<B>(&self, endpoint: &str, body: &B, expected: StatusCode) -> Result<()>
    where
        B: Serialize,
    {
        let url = self.url(endpoint);
        debug!(%url, "PATCH");

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status != expected {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SetupError::GraphApi(format!(
                "HTTP {}: {}",
                status,
                crate::error::enhance_graph_error(&error_text)
            )));
        }

        Ok(())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}
