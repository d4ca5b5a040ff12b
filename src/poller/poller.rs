use crate::app_config;
use crate::client::RtsClient;
use crate::device_registry::SharedRegistry;
use crate::domain::{Device, DeviceId, RtsKey, Status};
use crate::poller::snapshot::{RtsStatus, StatusSnapshot};
use futures::future::{join, join_all};
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum PollKey {
    Device(DeviceId),
    Rts(RtsKey),
}

#[derive(Debug)]
struct Shared {
    client: RtsClient,
    registry: SharedRegistry,
    snapshot_tx: watch::Sender<StatusSnapshot>,
    in_flight: Mutex<HashSet<PollKey>>,
    permits: Semaphore,
    interval: Duration,
}

impl Shared {
    fn in_flight(&self) -> MutexGuard<'_, HashSet<PollKey>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks a key as being polled until dropped.
struct InFlight {
    shared: Arc<Shared>,
    key: PollKey,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.shared.in_flight().remove(&self.key);
    }
}

/// Refreshes the status of every device and every displayed RTS on a fixed period.
///
/// A single scheduler task fans out one poll per key each tick, bounded by a semaphore. A key whose
/// previous poll is still running is skipped, and results for keys that were hidden in the meantime
/// are dropped. Subscribers receive a [`StatusSnapshot`] whenever something changed.
#[derive(Debug, Clone)]
pub struct Poller {
    shared: Arc<Shared>,
}

impl Poller {
    pub fn new(client: RtsClient, registry: SharedRegistry, config: &app_config::Poller) -> Self {
        let (snapshot_tx, _) = watch::channel(StatusSnapshot::default());

        Poller {
            shared: Arc::new(Shared {
                client,
                registry,
                snapshot_tx,
                in_flight: Mutex::new(HashSet::new()),
                permits: Semaphore::new(config.max_concurrent_requests()),
                interval: config.interval(),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> StatusSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    pub fn display(&self, key: RtsKey) {
        self.shared.snapshot_tx.send_if_modified(|snapshot| {
            if snapshot.rts.contains_key(&key) {
                return false;
            }
            snapshot.rts.insert(key, RtsStatus::default());
            true
        });
    }

    /// Replaces the displayed set, keeping the status of keys that stay on display.
    pub fn display_only(&self, keys: impl IntoIterator<Item = RtsKey>) {
        let keys = keys.into_iter().collect::<BTreeSet<_>>();

        self.shared.snapshot_tx.send_if_modified(|snapshot| {
            let before = snapshot.rts.len();
            snapshot.rts.retain(|key, _| keys.contains(key));
            let mut modified = snapshot.rts.len() != before;

            for key in &keys {
                if !snapshot.rts.contains_key(key) {
                    snapshot.rts.insert(*key, RtsStatus::default());
                    modified = true;
                }
            }

            modified
        });
    }

    pub fn hide(&self, key: RtsKey) {
        self.shared.snapshot_tx.send_if_modified(|snapshot| snapshot.rts.remove(&key).is_some());
    }

    pub fn hide_device(&self, device_id: DeviceId) {
        self.shared.snapshot_tx.send_if_modified(|snapshot| {
            let before = snapshot.rts.len();
            snapshot.rts.retain(|key, _| key.device_id != device_id);
            let device_removed = snapshot.devices.remove(&device_id).is_some();
            device_removed || snapshot.rts.len() != before
        });
    }

    /// Spawns the scheduler. Aborting the returned handle stops polling; polls already running finish on their own.
    pub fn start(&self) -> JoinHandle<()> {
        let poller = self.clone();

        tokio::spawn(async move {
            let mut ticker = interval(poller.shared.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!("🕗 Polling status every {:?}", poller.shared.interval);

            loop {
                ticker.tick().await;
                let tick = poller.clone();
                tokio::spawn(async move { tick.tick().await });
            }
        })
    }

    /// Polls every device and every displayed RTS once and waits for the results.
    #[instrument(skip_all)]
    pub async fn tick(&self) {
        let devices = self.shared.registry.read().await.list();
        let keys = self.shared.snapshot_tx.borrow().rts.keys().copied().collect::<Vec<_>>();

        let device_polls = devices
            .into_iter()
            .filter_map(|device| self.begin(PollKey::Device(device.id)).map(|in_flight| self.poll_device(device, in_flight)));
        let rts_polls = keys
            .into_iter()
            .filter_map(|key| self.begin(PollKey::Rts(key)).map(|in_flight| self.poll_rts(key, in_flight)));

        join(join_all(device_polls), join_all(rts_polls)).await;
    }

    fn begin(&self, key: PollKey) -> Option<InFlight> {
        if !self.shared.in_flight().insert(key) {
            debug!(?key, "🕗 Previous poll still running, skipping");
            return None;
        }

        Some(InFlight {
            shared: self.shared.clone(),
            key,
        })
    }

    async fn poll_device(&self, device: Device, _in_flight: InFlight) {
        let Ok(_permit) = self.shared.permits.acquire().await else {
            return;
        };
        let status = Status::from(self.shared.client.validate_device_connection(&device).await);

        let registry = self.shared.registry.read().await;
        if !registry.contains(device.id) {
            debug!(device_id = device.id, "Dropping status of removed device");
            return;
        }

        self.shared
            .snapshot_tx
            .send_if_modified(|snapshot| snapshot.devices.insert(device.id, status) != Some(status));
    }

    async fn poll_rts(&self, key: RtsKey, _in_flight: InFlight) {
        let device = self.shared.registry.read().await.get(key.device_id).cloned();
        let Some(device) = device else {
            warn!(device_id = key.device_id, rts_id = key.rts_id, "⚠️ Failed to get device with id: {}", key.device_id);
            self.commit(key, RtsStatus::mark_error);
            return;
        };

        let Ok(_permit) = self.shared.permits.acquire().await else {
            return;
        };
        let connection = self.shared.client.get_connection_status(&device, key.rts_id).await;
        let tracking = self.shared.client.get_tracking_status(&device, key.rts_id).await;

        self.commit(key, |status| status.apply(connection, tracking));
    }

    fn commit(&self, key: RtsKey, update: impl FnOnce(&mut RtsStatus)) {
        self.shared.snapshot_tx.send_if_modified(|snapshot| {
            let Some(status) = snapshot.rts.get_mut(&key) else {
                debug!(device_id = key.device_id, rts_id = key.rts_id, "Dropping status of hidden rts");
                return false;
            };

            let before = status.clone();
            update(status);
            let changed = *status != before;

            snapshot.refresh_target() || changed
        });
    }
}
