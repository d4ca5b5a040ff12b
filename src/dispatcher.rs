use crate::client::RtsClient;
use crate::device_registry::{RegistryError, SharedRegistry};
use crate::domain::commands::{Command, Outcome};
use crate::domain::tracking_settings::SettingOptions;
use crate::domain::{Device, DeviceId, LogDownload, RtsEntry, RtsKey, Status, TrackingSettings};
use crate::poller::Poller;
use crate::rts_fetch::{fetch_all_rts, start_all, stop_all};
use crate::scanner::{HostScanner, scan_for_devices};
use crate::validation::{self, ValidationError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Executes UI commands against the registry, the devices and the poller.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: SharedRegistry,
    client: RtsClient,
    poller: Poller,
    scanner: Arc<dyn HostScanner>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    NotFound(#[from] RegistryError),
    #[error("API request to device {device_id} failed: {action}")]
    RemoteFailed { device_id: DeviceId, action: &'static str },
}

impl Dispatcher {
    pub fn new(registry: SharedRegistry, client: RtsClient, poller: Poller, scanner: Arc<dyn HostScanner>) -> Self {
        Dispatcher {
            registry,
            client,
            poller,
            scanner,
        }
    }

    #[instrument(skip(self))]
    pub async fn dispatch(&self, command: Command) -> Result<Outcome, DispatchError> {
        match command {
            Command::AddDevice { name, ip, port } => {
                let candidate = validation::validate_device(&name, &ip, port)?;
                let device = self.registry.write().await.insert(candidate);
                Ok(Outcome::DeviceAdded(device))
            }
            Command::UpdateDevice { device_id, name, ip, port } => {
                let candidate = validation::validate_device(&name, &ip, port)?;
                self.registry.write().await.update(Device::new(device_id, candidate));
                Ok(Outcome::DeviceUpdated)
            }
            Command::RemoveDevice { device_id } => {
                let device = self.registry.write().await.delete(device_id)?;
                self.poller.hide_device(device_id);
                Ok(Outcome::DeviceRemoved(device))
            }
            Command::ListDevices => Ok(Outcome::Devices(self.registry.read().await.list())),
            Command::ScanNetwork { network, port } => {
                let network = validation::validate_network(&network)?;
                let port = validation::validate_port(port)?;
                let devices = scan_for_devices(self.scanner.as_ref(), &self.client, &self.registry, &network, port).await?;
                Ok(Outcome::DevicesDiscovered(devices))
            }
            Command::ListRts => {
                let entries = self.list_rts().await;
                Ok(Outcome::RtsList(entries))
            }
            Command::AddRts { device_id, rts } => {
                validation::validate_rts(&rts)?;
                let device = self.device(device_id).await?;
                let added = self
                    .client
                    .add_rts(&device, &rts)
                    .await
                    .ok_or(DispatchError::RemoteFailed { device_id, action: "add rts" })?;

                let entry = RtsEntry { device_id, rts: added };
                self.poller.display(entry.key());
                Ok(Outcome::RtsAdded(entry))
            }
            Command::RemoveRts { device_id, rts_id } => {
                let device = self.device(device_id).await?;
                if self.client.delete_rts(&device, rts_id).await {
                    self.poller.hide(RtsKey::new(device_id, rts_id));
                } else {
                    warn!(device_id, rts_id, "⚠️ Failed to delete rts {}", rts_id);
                }
                Ok(Outcome::RtsList(self.list_rts().await))
            }
            Command::TestRts { device_id, rts_id } => {
                let device = self.device(device_id).await?;
                let connected = self.client.validate_rts_connection(&device, rts_id).await;
                if connected {
                    self.client.ping_rts(&device, rts_id).await;
                }
                Ok(Outcome::RtsTested(Status::from(connected)))
            }
            Command::StartTracking { device_id, rts_id } => {
                let device = self.device(device_id).await?;
                accepted(self.client.start_tracking(&device, rts_id).await, device_id, "start tracking")
            }
            Command::StartDummyTracking { device_id, rts_id } => {
                let device = self.device(device_id).await?;
                accepted(self.client.start_dummy_tracking(&device, rts_id).await, device_id, "start dummy tracking")
            }
            Command::StopTracking { device_id, rts_id } => {
                let device = self.device(device_id).await?;
                accepted(self.client.stop_tracking(&device, rts_id).await, device_id, "stop tracking")
            }
            Command::ChangeFace { device_id, rts_id } => {
                let device = self.device(device_id).await?;
                accepted(self.client.change_face(&device, rts_id).await, device_id, "change face")
            }
            Command::StartAll => {
                let devices = self.registry.read().await.list();
                let rts_count = start_all(&self.client, &devices).await;
                info!("🟢 Started tracking on {} rts", rts_count);
                Ok(Outcome::TrackingChanged { rts_count })
            }
            Command::StopAll => {
                let devices = self.registry.read().await.list();
                let rts_count = stop_all(&self.client, &devices).await;
                info!("🔴 Stopped tracking on {} rts", rts_count);
                Ok(Outcome::TrackingChanged { rts_count })
            }
            Command::GetSettings { device_id, rts_id } => {
                let device = self.device(device_id).await?;
                let settings = self.client.get_tracking_settings(&device, rts_id).await.unwrap_or_else(|| {
                    warn!(device_id, rts_id, "⚠️ Falling back to default tracking settings");
                    TrackingSettings::default()
                });
                Ok(Outcome::Settings(settings))
            }
            Command::GetSettingOptions => Ok(Outcome::SettingOptions(SettingOptions::default())),
            Command::UpdateSettings { device_id, rts_id, form } => {
                validation::validate_tracking_settings(&form)?;
                let device = self.device(device_id).await?;
                let settings = form.into_settings();
                accepted(
                    self.client.update_tracking_settings(&device, rts_id, &settings).await,
                    device_id,
                    "update tracking settings",
                )
            }
            Command::TurnTo { device_id, rts_id, target } => {
                let device = self.device(device_id).await?;
                accepted(self.client.turn_to_target(&device, rts_id, &target).await, device_id, "turn to target")
            }
            Command::ListLogs { device_id, rts_id } => {
                let device = self.device(device_id).await?;
                Ok(Outcome::Logs(self.client.get_logs(&device, rts_id).await))
            }
            Command::DownloadLog { device_id, rts_id, log_id } => {
                let device = self.device(device_id).await?;
                info!(device_id, rts_id, log_id, "Downloading log {} from rts {} on device {}", log_id, rts_id, device_id);
                let content = self
                    .client
                    .download_log(&device, log_id)
                    .await
                    .ok_or(DispatchError::RemoteFailed { device_id, action: "download log" })?;
                Ok(Outcome::LogDownloaded(LogDownload::new(rts_id, log_id, content)))
            }
            Command::DeleteLog { device_id, rts_id, log_id } => {
                let device = self.device(device_id).await?;
                if !self.client.delete_log(&device, log_id).await {
                    return Err(DispatchError::RemoteFailed { device_id, action: "delete log" });
                }
                Ok(Outcome::Logs(self.client.get_logs(&device, rts_id).await))
            }
        }
    }

    async fn device(&self, device_id: DeviceId) -> Result<Device, RegistryError> {
        self.registry
            .read()
            .await
            .get(device_id)
            .cloned()
            .ok_or(RegistryError::NotFound { device_id })
    }

    /// Fetches the RTS of every device and puts exactly those on display.
    async fn list_rts(&self) -> Vec<RtsEntry> {
        let devices = self.registry.read().await.list();
        let entries = fetch_all_rts(&self.client, &devices).await;
        self.poller.display_only(entries.iter().map(RtsEntry::key));
        entries
    }
}

fn accepted(ok: bool, device_id: DeviceId, action: &'static str) -> Result<Outcome, DispatchError> {
    if ok {
        Ok(Outcome::Accepted)
    } else {
        Err(DispatchError::RemoteFailed { device_id, action })
    }
}
