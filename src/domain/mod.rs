pub mod commands;
pub mod device;
pub mod log;
pub mod position;
pub mod rts;
pub mod status;
pub mod tracking_settings;

pub use device::{Device, DeviceCreate, DeviceId, Endpoint};
pub use log::{Log, LogDownload, LogId};
pub use position::{ConnectionStatus, Position, Target, TrackingStatus};
pub use rts::{Rts, RtsCreate, RtsEntry, RtsId, RtsKey};
pub use status::Status;
pub use tracking_settings::{TrackingSettings, TrackingSettingsForm};
