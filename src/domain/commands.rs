use crate::domain::device::{Device, DeviceId};
use crate::domain::log::{Log, LogDownload, LogId};
use crate::domain::position::Target;
use crate::domain::rts::{RtsCreate, RtsEntry, RtsId};
use crate::domain::status::Status;
use crate::domain::tracking_settings::{SettingOptions, TrackingSettings, TrackingSettingsForm};
use serde::{Deserialize, Serialize};

/// A UI action. Form input arrives unvalidated.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    AddDevice { name: String, ip: String, port: u32 },
    UpdateDevice { device_id: DeviceId, name: String, ip: String, port: u32 },
    RemoveDevice { device_id: DeviceId },
    ListDevices,
    ScanNetwork { network: String, port: u32 },
    ListRts,
    AddRts { device_id: DeviceId, rts: RtsCreate },
    RemoveRts { device_id: DeviceId, rts_id: RtsId },
    TestRts { device_id: DeviceId, rts_id: RtsId },
    StartTracking { device_id: DeviceId, rts_id: RtsId },
    StartDummyTracking { device_id: DeviceId, rts_id: RtsId },
    StopTracking { device_id: DeviceId, rts_id: RtsId },
    ChangeFace { device_id: DeviceId, rts_id: RtsId },
    StartAll,
    StopAll,
    GetSettings { device_id: DeviceId, rts_id: RtsId },
    GetSettingOptions,
    UpdateSettings { device_id: DeviceId, rts_id: RtsId, form: TrackingSettingsForm },
    TurnTo { device_id: DeviceId, rts_id: RtsId, target: Target },
    ListLogs { device_id: DeviceId, rts_id: RtsId },
    DownloadLog { device_id: DeviceId, rts_id: RtsId, log_id: LogId },
    DeleteLog { device_id: DeviceId, rts_id: RtsId, log_id: LogId },
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum Outcome {
    DeviceAdded(Device),
    DeviceUpdated,
    DeviceRemoved(Device),
    Devices(Vec<Device>),
    DevicesDiscovered(Vec<Device>),
    RtsList(Vec<RtsEntry>),
    RtsAdded(RtsEntry),
    RtsTested(Status),
    Accepted,
    TrackingChanged { rts_count: usize },
    Settings(TrackingSettings),
    SettingOptions(SettingOptions),
    Logs(Vec<Log>),
    LogDownloaded(LogDownload),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn commands_are_tagged_by_name() -> Result<(), serde_json::Error> {
        let command: Command = serde_json::from_value(json!({"command": "stop_tracking", "device_id": 0, "rts_id": 2}))?;
        let unit: Command = serde_json::from_value(json!({"command": "list_rts"}))?;

        assert_eq!(command, Command::StopTracking { device_id: 0, rts_id: 2 });
        assert_eq!(unit, Command::ListRts);
        Ok(())
    }

    #[test]
    fn outcomes_carry_their_data_next_to_the_tag() -> Result<(), serde_json::Error> {
        let outcome = serde_json::to_value(Outcome::TrackingChanged { rts_count: 3 })?;
        let accepted = serde_json::to_value(Outcome::Accepted)?;

        assert_eq!(outcome, json!({"outcome": "tracking_changed", "data": {"rts_count": 3}}));
        assert_eq!(accepted, json!({"outcome": "accepted"}));
        Ok(())
    }
}
