use crate::domain::tracking_settings::{
    EDM_MEASUREMENT_MODE_OPTIONS, INCLINATION_MODE_OPTIONS, MEASUREMENT_MODE_OPTIONS, PRISM_TYPE_OPTIONS, is_option,
};
use crate::domain::{DeviceCreate, RtsCreate, TrackingSettingsForm};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;

/// Largest sweep a scan will attempt.
pub const MAX_SCAN_HOSTS: u128 = 65_536;

pub fn validate_ip_address(ip: &str) -> Result<IpAddr, ValidationError> {
    ip.parse::<IpAddr>().map_err(|_| ValidationError::InvalidIpAddress(ip.to_string()))
}

pub fn validate_port(port: u32) -> Result<u16, ValidationError> {
    match u16::try_from(port) {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ValidationError::InvalidPort(port)),
    }
}

pub fn validate_network(network: &str) -> Result<Network, ValidationError> {
    let invalid = || ValidationError::InvalidNetwork(network.to_string());

    let (address, prefix) = network.trim().split_once('/').ok_or_else(invalid)?;
    let address = address.parse::<IpAddr>().map_err(|_| invalid())?;
    let prefix = prefix.parse::<u8>().map_err(|_| invalid())?;

    let width = match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    if prefix > width {
        return Err(invalid());
    }

    Ok(Network { address, prefix })
}

pub fn validate_device(name: &str, ip: &str, port: u32) -> Result<DeviceCreate, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Incomplete("device name"));
    }

    let ip = validate_ip_address(ip)?;
    let port = validate_port(port)?;

    Ok(DeviceCreate {
        name: name.trim().to_string(),
        ip: ip.to_string(),
        port,
    })
}

pub fn validate_rts(rts: &RtsCreate) -> Result<(), ValidationError> {
    let missing = [
        ("name", rts.name.trim().is_empty()),
        ("port", rts.port.trim().is_empty()),
        ("baudrate", rts.baudrate == 0),
        ("parity", rts.parity.trim().is_empty()),
        ("stopbits", rts.stopbits == 0),
        ("bytesize", rts.bytesize == 0),
        ("timeout", rts.timeout == 0),
    ];

    match missing.into_iter().find(|(_, missing)| *missing) {
        Some((field, _)) => Err(ValidationError::Incomplete(field)),
        None => Ok(()),
    }
}

pub fn validate_tracking_settings(form: &TrackingSettingsForm) -> Result<(), ValidationError> {
    let choices = [
        ("measurement mode", is_option(MEASUREMENT_MODE_OPTIONS, form.measurement_mode)),
        ("inclination mode", is_option(INCLINATION_MODE_OPTIONS, form.inclination_mode)),
        ("EDM mode", is_option(EDM_MEASUREMENT_MODE_OPTIONS, form.edm_mode)),
        ("prism type", is_option(PRISM_TYPE_OPTIONS, form.prism_type)),
    ];

    if let Some((setting, _)) = choices.into_iter().find(|(_, valid)| !*valid) {
        return Err(ValidationError::InvalidSetting(setting));
    }

    let ranges_valid = form.fine_adjust_horizontal_search_range.is_finite()
        && form.fine_adjust_horizontal_search_range >= 0.0
        && form.fine_adjust_vertical_search_range.is_finite()
        && form.fine_adjust_vertical_search_range >= 0.0;
    if !ranges_valid {
        return Err(ValidationError::InvalidSetting("fine adjust search range"));
    }

    if form.power_search_range <= 0 {
        return Err(ValidationError::InvalidSetting("power search range"));
    }

    Ok(())
}

/// An IP network in CIDR notation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Network {
    address: IpAddr,
    prefix: u8,
}

impl Network {
    /// The scannable hosts. Network and broadcast addresses are skipped for IPv4 prefixes shorter than /31.
    pub fn hosts(&self) -> Result<Vec<IpAddr>, ValidationError> {
        match self.address {
            IpAddr::V4(address) => {
                let host_bits = 32 - u32::from(self.prefix);
                let size = 1u128 << host_bits;
                self.check_size(size)?;

                let mask = u32::MAX.checked_shl(host_bits).unwrap_or(0);
                let first = u32::from(address) & mask;
                let last = first | !mask;
                let (first, last) = if host_bits >= 2 { (first + 1, last - 1) } else { (first, last) };

                Ok((first..=last).map(|host| IpAddr::V4(Ipv4Addr::from(host))).collect())
            }
            IpAddr::V6(address) => {
                let host_bits = 128 - u32::from(self.prefix);
                let size = 1u128.checked_shl(host_bits).unwrap_or(u128::MAX);
                self.check_size(size)?;

                let mask = u128::MAX.checked_shl(host_bits).unwrap_or(0);
                let first = u128::from(address) & mask;
                let last = first | !mask;

                Ok((first..=last).map(|host| IpAddr::V6(Ipv6Addr::from(host))).collect())
            }
        }
    }

    fn check_size(&self, size: u128) -> Result<(), ValidationError> {
        if size > MAX_SCAN_HOSTS {
            return Err(ValidationError::NetworkTooLarge(self.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid IP address '{0}'")]
    InvalidIpAddress(String),
    #[error("invalid port {0}, expected 1-65535")]
    InvalidPort(u32),
    #[error("invalid network '{0}', expected CIDR notation")]
    InvalidNetwork(String),
    #[error("network {0} is too large to scan")]
    NetworkTooLarge(String),
    #[error("inputs incomplete: missing {0}")]
    Incomplete(&'static str),
    #[error("invalid {0}")]
    InvalidSetting(&'static str),
}
