//! services/client/src/adapters/pinata.rs
//!
//! Adapter for the Pinata pinning API. Implements the `PinningService` port.

use async_trait::async_trait;
use docdesk_core::domain::FileSource;
use docdesk_core::ports::{PinningService, PortError, PortResult};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::{describe_failure, file_form};

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinResponse {
    ipfs_hash: Option<String>,
}

pub struct PinataAdapter {
    client: Client,
    endpoint: Url,
    gateway_url: String,
    api_key: String,
    secret_key: String,
}

impl PinataAdapter {
    pub fn new(
        client: Client,
        endpoint: Url,
        gateway_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint,
            gateway_url: gateway_url.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }

    fn retrieval_url(&self, hash: &str) -> String {
        format!("{}{}", self.gateway_url, hash)
    }
}

#[async_trait]
impl PinningService for PinataAdapter {
    async fn pin_file(&self, file: &FileSource) -> PortResult<String> {
        let form = file_form(file)?;
        debug!(url = %self.endpoint, file = %file.name, "POST pinFileToIPFS");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.secret_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::UploadFailed(describe_failure(response).await));
        }

        let body: PinResponse = response
            .json()
            .await
            .map_err(|e| PortError::UploadFailed(format!("malformed pinning response: {}", e)))?;

        let hash = body
            .ipfs_hash
            .filter(|hash| !hash.is_empty())
            .ok_or_else(|| PortError::UploadFailed("response did not include IpfsHash".to_string()))?;

        Ok(self.retrieval_url(&hash))
    }
}
