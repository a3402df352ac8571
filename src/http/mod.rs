use crate::error::{Error, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const AUTH_HEADER: &str = "X-Emby-Token";

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jellyroll/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::UpstreamTransport)?;

        Ok(Self { client })
    }

    #[instrument(skip(self, api_key), fields(url = %url))]
    pub async fn get(&self, url: &str, api_key: &str) -> Result<Response> {
        debug!("Making GET request");
        let response = self
            .client
            .get(url)
            .header(AUTH_HEADER, api_key)
            .send()
            .await
            .map_err(|e| {
                error!("HTTP request failed: {}", e);
                Error::UpstreamTransport(e)
            })?;

        if !response.status().is_success() {
            error!("HTTP request failed with status: {}", response.status());
            return Err(Error::UpstreamStatus(response.status()));
        }

        Ok(response)
    }

    #[instrument(skip(self, api_key), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, api_key: &str) -> Result<T> {
        let response = self.get(url, api_key).await?;
        response.json::<T>().await.map_err(|e| {
            error!("Failed to decode response body: {}", e);
            Error::UpstreamDecode(e)
        })
    }
}
