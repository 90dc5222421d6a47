use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub device: DeviceConfig,
    pub watchdog: WatchdogConfig,
    pub commands: CommandConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    /// Origin the dashboard page would be served from, e.g. `http://10.0.0.5:8080`.
    pub origin: String,
    pub ws_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatchdogConfig {
    pub silence_timeout_secs: u64,
    /// Pause before reconnecting. Zero retries immediately.
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommandConfig {
    pub request_timeout_secs: u64,
}

impl WatchdogConfig {
    /// A zero window would mark the channel stale right after every frame.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.silence_timeout_secs == 0 {
            anyhow::bail!("watchdog.silence_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn silence_timeout(&self) -> Duration {
        Duration::from_secs(self.silence_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl CommandConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl DeviceConfig {
    pub fn origin_url(&self) -> anyhow::Result<Url> {
        let origin = Url::parse(&self.origin)
            .with_context(|| format!("Invalid device origin {}", self.origin))?;
        match origin.scheme() {
            "http" | "https" => Ok(origin),
            other => anyhow::bail!("Device origin must be http or https, got {}", other),
        }
    }

    /// Websocket endpoint on the same host as the origin.
    pub fn channel_endpoint(&self) -> anyhow::Result<Url> {
        let mut endpoint = self.origin_url()?;
        let scheme = if endpoint.scheme() == "https" { "wss" } else { "ws" };
        endpoint
            .set_scheme(scheme)
            .map_err(|_| anyhow::anyhow!("Cannot derive {} endpoint from {}", scheme, self.origin))?;
        endpoint.set_path(&self.ws_path);
        endpoint.set_query(None);
        endpoint.set_fragment(None);
        Ok(endpoint)
    }
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    load_dashboard_config_from("config/dashboard")
}

pub fn load_dashboard_config_from(name: &str) -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .set_default("device.origin", "http://localhost:8080")?
        .set_default("device.ws_path", "/ws")?
        .set_default("watchdog.silence_timeout_secs", 15)?
        .set_default("watchdog.reconnect_delay_ms", 0)?
        .set_default("commands.request_timeout_secs", 5)?
        .add_source(config::File::with_name(name).required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.watchdog.validate()?;
    Ok(config)
}
