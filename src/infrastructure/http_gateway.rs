// REST client for the device's command and settings endpoints
use crate::application::command_gateway::{Command, CommandError, CommandGateway};
use crate::domain::settings::DeviceSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpDeviceClient {
    origin: Url,
    client: reqwest::Client,
}

impl HttpDeviceClient {
    pub fn new(origin: Url, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { origin, client })
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.origin.join(path)
    }

    /// One-shot fetch of channel names and calibration constants.
    pub async fn fetch_settings(&self) -> Result<DeviceSettings> {
        let url = self.url("/getSettings")?;
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send settings request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Settings request failed with status {}: {}", status, body);
        }

        response
            .json::<DeviceSettings>()
            .await
            .context("Failed to parse device settings")
    }
}

#[async_trait]
impl CommandGateway for HttpDeviceClient {
    async fn send(&self, command: &Command) -> Result<(), CommandError> {
        let url = self
            .url(&command.path())
            .map_err(|e| CommandError::Transport(e.to_string()))?;

        tracing::debug!(%command, %url, "sending command");
        let response = self
            .client
            .put(url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| CommandError::Transport(e.to_string()))?;

        // The body echoes fuel-cell status; state comes from the push channel instead.
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CommandError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
