use crate::domain::device::DeviceId;
use serde::{Deserialize, Serialize};

pub type RtsId = u64;

/// Serial connection parameters sent to a device to register a new RTS.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RtsCreate {
    pub name: String,
    pub baudrate: u32,
    pub port: String,
    pub timeout: u32,
    pub parity: String,
    pub stopbits: u8,
    pub bytesize: u8,
}

/// An RTS as reported by the device that hosts it. The id is assigned by the device.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Rts {
    pub id: RtsId,
    pub name: String,
    pub baudrate: u32,
    pub port: String,
    pub timeout: u32,
    pub parity: String,
    pub stopbits: u8,
    pub bytesize: u8,
}

/// Identifies one RTS across all devices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RtsKey {
    pub device_id: DeviceId,
    pub rts_id: RtsId,
}

impl RtsKey {
    pub fn new(device_id: DeviceId, rts_id: RtsId) -> Self {
        RtsKey { device_id, rts_id }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct RtsEntry {
    pub device_id: DeviceId,
    pub rts: Rts,
}

impl RtsEntry {
    pub fn key(&self) -> RtsKey {
        RtsKey::new(self.device_id, self.rts.id)
    }
}
