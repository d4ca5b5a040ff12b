use config::{Config, ConfigError};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_NETWORK: &str = "192.168.0.0/24";
pub const DEFAULT_PORT: u16 = 8000;
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    network: String,
    port: u16,
    core: Core,
    client: Client,
    poller: Poller,
}

impl AppConfig {
    /// Reads `config.toml`, an optional `config_local.toml` and the environment, in that order.
    /// `NETWORK` and `PORT` override the network sweep.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("network", DEFAULT_NETWORK)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }
}

#[derive(Debug, Deserialize)]
pub struct Core {
    scan_on_startup: bool,
}

impl Core {
    pub fn scan_on_startup(&self) -> bool {
        self.scan_on_startup
    }
}

#[derive(Debug, Deserialize)]
pub struct Client {
    #[serde(with = "humantime_serde")]
    request_timeout: Duration,
    #[serde(with = "humantime_serde")]
    probe_timeout: Duration,
    #[serde(with = "humantime_serde")]
    scan_connect_timeout: Duration,
}

impl Client {
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn scan_connect_timeout(&self) -> Duration {
        self.scan_connect_timeout
    }
}

#[derive(Debug, Deserialize)]
pub struct Poller {
    #[serde(with = "humantime_serde")]
    interval: Duration,
    max_concurrent_requests: usize,
}

impl Poller {
    /// Never shorter than [`MIN_POLL_INTERVAL`].
    pub fn interval(&self) -> Duration {
        self.interval.max(MIN_POLL_INTERVAL)
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests.max(1)
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                network: DEFAULT_NETWORK.to_string(),
                port: DEFAULT_PORT,
                core: Core { scan_on_startup: false },
                client: Client {
                    request_timeout: Duration::from_secs(1),
                    probe_timeout: Duration::from_millis(250),
                    scan_connect_timeout: Duration::from_millis(100),
                },
                poller: Poller {
                    interval: Duration::from_millis(1000),
                    max_concurrent_requests: 4,
                },
            },
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.client.request_timeout = timeout;
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.client.probe_timeout = timeout;
        self
    }

    pub fn poller_interval(mut self, interval: Duration) -> Self {
        self.config.poller.interval = interval;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
