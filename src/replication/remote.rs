//! Remote store tier
//!
//! A genuine HTTP client with a bounded timeout; the tier only exists
//! when a remote URL is configured. Unavailability of the remote side
//! surfaces as a tier error for the coordinator to absorb, never as a
//! hang.

use axum::async_trait;
use reqwest::Client;
use reqwest::StatusCode;

use super::Error;
use super::RemoteConfig;
use super::Result;
use super::Snapshot;
use super::Tier;

/// A remote key-value store holding one snapshot document
pub struct RemoteTier {
    /// Client with the configured timeout baked in
    client: Client,

    /// Endpoint accepting `PUT` and `GET` of the snapshot
    url: String,
}

impl RemoteTier {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(remote_error)?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl Tier for RemoteTier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.client
            .put(&self.url)
            .json(snapshot)
            .send()
            .await
            .map_err(remote_error)?
            .error_for_status()
            .map_err(remote_error)?;

        Ok(())
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        let response = self.client.get(&self.url).send().await.map_err(remote_error)?;

        // a store that has never seen a snapshot is empty, not broken
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let snapshot = response
            .error_for_status()
            .map_err(remote_error)?
            .json::<Snapshot>()
            .await
            .map_err(remote_error)?;

        Ok(Some(snapshot))
    }
}

fn remote_error(err: reqwest::Error) -> Error {
    Error::Remote(err.to_string())
}
