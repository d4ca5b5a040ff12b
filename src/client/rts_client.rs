use crate::client::transport::{Transport, TransportError, TransportRequest};
use crate::domain::{ConnectionStatus, Device, Endpoint, Log, LogId, Rts, RtsCreate, RtsId, Target, TrackingSettings, TrackingStatus};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

const LIVENESS_MESSAGE: &str = "Server is running";

/// Talks to the HTTP API a device exposes for its RTS.
///
/// Every operation is a single request without retries. Failures are logged and mapped to a
/// sentinel (`false`, an empty list or `None`) so callers never have to handle transport errors.
#[derive(Debug, Clone)]
pub struct RtsClient {
    transport: Arc<dyn Transport>,
    request_timeout: Duration,
    probe_timeout: Duration,
}

#[derive(Debug)]
pub struct Reply {
    body: Vec<u8>,
}

impl Reply {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl RtsClient {
    pub fn new(transport: Arc<dyn Transport>, request_timeout: Duration, probe_timeout: Duration) -> Self {
        RtsClient {
            transport,
            request_timeout,
            probe_timeout,
        }
    }

    /// Issues one request against `device`. Only a 200 counts as success.
    pub async fn request(
        &self,
        device: &(impl Endpoint + ?Sized),
        method: Method,
        path: &str,
        body: Option<Value>,
        timeout: Duration,
    ) -> Result<Reply, RequestError> {
        let request = TransportRequest {
            method,
            url: format!("{}{}", device.base_url(), path),
            body,
            timeout,
        };

        match self.transport.send(request).await {
            Err(e) => {
                error!(ip = device.ip(), port = device.port(), "❌ Failed to connect to device with ip: {} and port: {}: {}", device.ip(), device.port(), e);
                Err(e.into())
            }
            Ok(response) if response.status != StatusCode::OK => {
                let body = String::from_utf8_lossy(&response.body).into_owned();
                warn!(ip = device.ip(), port = device.port(), status_code = %response.status, "⚠️ Request {} failed. Response: {:?}", path, body);
                Err(RequestError::Status {
                    status: response.status,
                    body,
                })
            }
            Ok(response) => Ok(Reply { body: response.body }),
        }
    }

    async fn call(&self, device: &(impl Endpoint + ?Sized), method: Method, path: &str) -> Result<Reply, RequestError> {
        self.request(device, method, path, None, self.request_timeout).await
    }

    async fn call_with<B: Serialize>(&self, device: &Device, method: Method, path: &str, body: &B) -> Result<Reply, RequestError> {
        let body = serde_json::to_value(body)?;
        self.request(device, method, path, Some(body), self.request_timeout).await
    }

    async fn call_json<T: DeserializeOwned>(&self, device: &Device, path: &str) -> Result<T, RequestError> {
        self.call(device, Method::GET, path).await?.json()
    }

    /// Liveness probe with the short probe timeout. Any reply other than the expected greeting counts as unreachable.
    #[instrument(skip_all, fields(ip = device.ip(), port = device.port()))]
    pub async fn validate_device_connection(&self, device: &(impl Endpoint + ?Sized)) -> bool {
        let reply = match self.request(device, Method::GET, "/", None, self.probe_timeout).await {
            Ok(reply) => reply,
            Err(_) => return false,
        };

        match reply.json::<Value>() {
            Ok(value) => value.get("message").and_then(Value::as_str) == Some(LIVENESS_MESSAGE),
            Err(e) => {
                warn!("⚠️ Device answered the liveness probe with invalid JSON: {}", e);
                false
            }
        }
    }

    #[instrument(skip_all, fields(device_id = device.id))]
    pub async fn add_rts(&self, device: &Device, rts: &RtsCreate) -> Option<Rts> {
        let result = match self.call_with(device, Method::POST, "/rts/", rts).await {
            Ok(reply) => reply.json::<Rts>(),
            Err(e) => Err(e),
        };

        match result {
            Ok(added) => {
                info!(rts_id = added.id, "🟢 Added rts '{}'", rts.name);
                Some(added)
            }
            Err(e) => {
                error!("❌ Failed to add rts '{}': {}", rts.name, e);
                None
            }
        }
    }

    pub async fn delete_rts(&self, device: &Device, rts_id: RtsId) -> bool {
        let deleted = self.call(device, Method::DELETE, &format!("/rts/{}", rts_id)).await.is_ok();
        if deleted {
            info!(device_id = device.id, rts_id, "🔴 Deleted rts with id: {}", rts_id);
        }
        deleted
    }

    pub async fn get_rts(&self, device: &Device) -> Vec<Rts> {
        self.call_json::<Vec<Rts>>(device, "/rts/").await.unwrap_or_else(|e| {
            warn!(device_id = device.id, "⚠️ Unable to list the rts of device '{}': {}", device.name, e);
            Vec::new()
        })
    }

    pub async fn validate_rts_connection(&self, device: &Device, rts_id: RtsId) -> bool {
        self.call(device, Method::GET, &format!("/rts/test/{}", rts_id)).await.is_ok()
    }

    pub async fn start_tracking(&self, device: &Device, rts_id: RtsId) -> bool {
        self.call(device, Method::POST, &format!("/tracking/start/{}", rts_id)).await.is_ok()
    }

    pub async fn start_dummy_tracking(&self, device: &Device, rts_id: RtsId) -> bool {
        self.call(device, Method::POST, &format!("/tracking/start/dummy/{}", rts_id)).await.is_ok()
    }

    pub async fn stop_tracking(&self, device: &Device, rts_id: RtsId) -> bool {
        self.call(device, Method::POST, &format!("/tracking/stop/{}", rts_id)).await.is_ok()
    }

    pub async fn change_face(&self, device: &Device, rts_id: RtsId) -> bool {
        self.call(device, Method::POST, &format!("/tracking/change_face/{}", rts_id)).await.is_ok()
    }

    pub async fn get_tracking_status(&self, device: &Device, rts_id: RtsId) -> Option<TrackingStatus> {
        self.call_json(device, &format!("/tracking/status/{}", rts_id))
            .await
            .inspect_err(|e| warn!(device_id = device.id, rts_id, "⚠️ Unable to get the tracking status: {}", e))
            .ok()
    }

    pub async fn get_connection_status(&self, device: &Device, rts_id: RtsId) -> Option<ConnectionStatus> {
        self.call_json(device, &format!("/rts/status/{}", rts_id))
            .await
            .inspect_err(|e| warn!(device_id = device.id, rts_id, "⚠️ Unable to get the connection status: {}", e))
            .ok()
    }

    pub async fn ping_rts(&self, device: &Device, rts_id: RtsId) -> bool {
        self.call(device, Method::GET, &format!("/rts/ping/{}", rts_id)).await.is_ok()
    }

    pub async fn get_tracking_settings(&self, device: &Device, rts_id: RtsId) -> Option<TrackingSettings> {
        self.call_json(device, &format!("/tracking/settings/{}", rts_id))
            .await
            .inspect_err(|e| warn!(device_id = device.id, rts_id, "⚠️ Unable to get the tracking settings: {}", e))
            .ok()
    }

    pub async fn update_tracking_settings(&self, device: &Device, rts_id: RtsId, settings: &TrackingSettings) -> bool {
        self.call_with(device, Method::PUT, &format!("/tracking/settings/{}", rts_id), settings)
            .await
            .is_ok()
    }

    pub async fn turn_to_target(&self, device: &Device, rts_id: RtsId, target: &Target) -> bool {
        self.call_with(device, Method::PUT, &format!("/rts/turnto/{}", rts_id), target).await.is_ok()
    }

    pub async fn get_logs(&self, device: &Device, rts_id: RtsId) -> Vec<Log> {
        self.call_json::<Vec<Log>>(device, &format!("/logs/rts/{}", rts_id))
            .await
            .unwrap_or_else(|e| {
                warn!(device_id = device.id, rts_id, "⚠️ Unable to list logs: {}", e);
                Vec::new()
            })
    }

    pub async fn download_log(&self, device: &Device, log_id: LogId) -> Option<Vec<u8>> {
        self.call(device, Method::GET, &format!("/logs/download/{}", log_id))
            .await
            .map(Reply::into_bytes)
            .ok()
    }

    pub async fn delete_log(&self, device: &Device, log_id: LogId) -> bool {
        let deleted = self.call(device, Method::DELETE, &format!("/logs/{}", log_id)).await.is_ok();
        if deleted {
            info!(device_id = device.id, log_id, "🔴 Deleted log with id: {}", log_id);
        }
        deleted
    }
}
