use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

pub type DeviceId = u64;

/// Anything the dashboard can send a request to.
pub trait Endpoint {
    fn ip(&self) -> &str;
    fn port(&self) -> u16;

    fn base_url(&self) -> String {
        match self.ip().parse::<IpAddr>() {
            Ok(ip) => format!("http://{}", SocketAddr::new(ip, self.port())),
            Err(_) => format!("http://{}:{}", self.ip(), self.port()),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DeviceCreate {
    pub name: String,
    pub ip: String,
    pub port: u16,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub ip: String,
    pub port: u16,
}

impl Device {
    pub fn new(id: DeviceId, candidate: DeviceCreate) -> Self {
        Device {
            id,
            name: candidate.name,
            ip: candidate.ip,
            port: candidate.port,
        }
    }
}

impl Endpoint for Device {
    fn ip(&self) -> &str {
        &self.ip
    }

    fn port(&self) -> u16 {
        self.port
    }
}

impl Endpoint for DeviceCreate {
    fn ip(&self) -> &str {
        &self.ip
    }

    fn port(&self) -> u16 {
        self.port
    }
}
