mod rts_client;
pub mod transport;

pub use rts_client::RtsClient;
pub use transport::HttpTransport;

use crate::app_config::AppConfig;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;

pub fn new_client(config: &AppConfig) -> Result<RtsClient, ClientError> {
    let client = Client::builder().build()?;
    let transport = Arc::new(HttpTransport::new(client));

    Ok(RtsClient::new(transport, config.client().request_timeout(), config.client().probe_timeout()))
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use crate::domain::DeviceCreate;

    #[tokio::test]
    async fn new_client_probes_devices_with_the_configured_timeout() -> Result<(), ClientError> {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"message": "Server is running"}"#)
            .create_async()
            .await;

        let config = AppConfigBuilder::new().probe_timeout(std::time::Duration::from_millis(500)).build();
        let client = new_client(&config)?;
        let address = server.socket_address();
        let candidate = DeviceCreate {
            name: "mock".to_string(),
            ip: address.ip().to_string(),
            port: address.port(),
        };

        assert!(client.validate_device_connection(&candidate).await);

        // Verify that the probe reached the device
        mock.assert_async().await;

        Ok(())
    }
}
