use crate::domain::{Device, DeviceCreate, DeviceId};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

pub type SharedRegistry = Arc<RwLock<DeviceRegistry>>;

/// In-memory store of known devices. Ids are handed out sequentially and never reused, so id order is insertion order.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<DeviceId, Device>,
    next_id: DeviceId,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    pub fn insert(&mut self, candidate: DeviceCreate) -> Device {
        let device = Device::new(self.next_id, candidate);
        self.next_id += 1;
        self.devices.insert(device.id, device.clone());
        info!(device_id = device.id, "🟢 Inserted device '{}' at {}:{}", device.name, device.ip, device.port);
        device
    }

    pub fn get(&self, device_id: DeviceId) -> Option<&Device> {
        self.devices.get(&device_id)
    }

    pub fn contains(&self, device_id: DeviceId) -> bool {
        self.devices.contains_key(&device_id)
    }

    /// Replaces a known device. Unknown ids are ignored.
    pub fn update(&mut self, device: Device) {
        let Some(stored) = self.devices.get_mut(&device.id) else {
            info!(device_id = device.id, "Device {} not found, no update performed", device.id);
            return;
        };

        info!(device_id = device.id, "🟢 Updating device {}", device.id);
        *stored = device;
    }

    pub fn delete(&mut self, device_id: DeviceId) -> Result<Device, RegistryError> {
        let device = self.devices.remove(&device_id).ok_or(RegistryError::NotFound { device_id })?;
        info!(device_id, "🔴 Deleted device '{}'", device.name);
        Ok(device)
    }

    pub fn list(&self) -> Vec<Device> {
        self.devices.values().cloned().collect()
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("device {device_id} not found")]
    NotFound { device_id: DeviceId },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidate(name: &str, ip: &str) -> DeviceCreate {
        DeviceCreate {
            name: name.to_string(),
            ip: ip.to_string(),
            port: 8000,
        }
    }

    fn ids(registry: &DeviceRegistry) -> Vec<DeviceId> {
        registry.list().iter().map(|device| device.id).collect()
    }

    #[test]
    fn insert_assigns_sequential_ids_starting_at_zero() {
        let mut registry = DeviceRegistry::new();

        let first = registry.insert(candidate("Leica-1", "10.0.0.5"));
        let second = registry.insert(candidate("Leica-2", "10.0.0.6"));

        assert_eq!(first.id, 0);
        assert_eq!(second.id, 1);
        assert_eq!(registry.get(0), Some(&first));
        assert_eq!(ids(&registry), vec![0, 1]);
    }

    #[test]
    fn ids_are_never_reused_after_deletes() -> Result<(), RegistryError> {
        let mut registry = DeviceRegistry::new();
        let mut seen = Vec::new();

        for round in 0..5 {
            let device = registry.insert(candidate("device", "10.0.0.1"));
            seen.push(device.id);
            if round % 2 == 0 {
                registry.delete(device.id)?;
            }
        }

        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(ids(&registry), vec![1, 3]);
        Ok(())
    }

    #[test]
    fn emptying_the_registry_keeps_ids_retired() -> Result<(), RegistryError> {
        let mut registry = DeviceRegistry::new();
        registry.insert(candidate("a", "10.0.0.1"));
        registry.insert(candidate("b", "10.0.0.2"));

        registry.delete(0)?;
        registry.delete(1)?;
        let device = registry.insert(candidate("c", "10.0.0.3"));

        assert_eq!(device.id, 2);
        Ok(())
    }

    #[test]
    fn get_returns_none_for_unknown_ids() {
        let registry = DeviceRegistry::new();

        assert_eq!(registry.get(7), None);
        assert!(!registry.contains(7));
    }

    #[test]
    fn update_replaces_a_known_device() {
        let mut registry = DeviceRegistry::new();
        let mut device = registry.insert(candidate("Leica-1", "10.0.0.5"));

        device.name = "Leica-1 north".to_string();
        device.port = 8080;
        registry.update(device.clone());

        assert_eq!(registry.get(device.id), Some(&device));
    }

    #[test]
    fn update_of_an_unknown_device_is_a_no_op() {
        let mut registry = DeviceRegistry::new();
        registry.insert(candidate("Leica-1", "10.0.0.5"));
        let before = registry.list();

        registry.update(Device::new(42, candidate("ghost", "10.0.0.9")));

        assert_eq!(registry.list(), before);
        assert_eq!(registry.get(42), None);
    }

    #[test]
    fn delete_of_an_unknown_device_fails_and_leaves_the_registry_unchanged() {
        let mut registry = DeviceRegistry::new();
        registry.insert(candidate("Leica-1", "10.0.0.5"));
        let before = registry.list();

        let result = registry.delete(3);

        assert_eq!(result, Err(RegistryError::NotFound { device_id: 3 }));
        assert_eq!(registry.list(), before);
    }

    #[test]
    fn add_delete_re_add_scenario() -> Result<(), RegistryError> {
        let mut registry = DeviceRegistry::new();

        let first = registry.insert(DeviceCreate {
            name: "Leica-1".to_string(),
            ip: "10.0.0.5".to_string(),
            port: 8000,
        });
        let second = registry.insert(candidate("Leica-2", "10.0.0.6"));
        assert_eq!((first.id, second.id), (0, 1));

        registry.delete(0)?;
        assert_eq!(ids(&registry), vec![1]);

        let third = registry.insert(candidate("Leica-3", "10.0.0.7"));
        assert_eq!(third.id, 2);
        assert_eq!(ids(&registry), vec![1, 2]);
        Ok(())
    }
}
