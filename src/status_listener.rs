use crate::domain::{RtsKey, Status};
use crate::poller::{RtsStatus, StatusSnapshot};
use tokio::sync::watch::Receiver;
use tracing::{debug, info, instrument};

/// Follows the published snapshots and logs every indicator that changed.
#[instrument(skip_all)]
pub async fn status_listener(mut rx: Receiver<StatusSnapshot>) {
    let mut previous = rx.borrow().clone();

    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        log_changes(&previous, &snapshot);
        previous = snapshot;
    }

    debug!("Status channel closed");
}

fn log_changes(previous: &StatusSnapshot, current: &StatusSnapshot) {
    for (device_id, status) in &current.devices {
        if previous.devices.get(device_id) != Some(status) {
            info!(device_id, "{} Device {} is {:?}", icon(*status), device_id, status);
        }
    }

    for (key, status) in &current.rts {
        match previous.rts.get(key) {
            Some(before) if !indicators_changed(before, status) => {}
            _ => log_rts(key, status),
        }
    }

    if previous.target != current.target {
        let target = &current.target;
        info!("🎯 Target is at ({}, {}, {}) from '{}'", target.pos_x, target.pos_y, target.pos_z, target.device);
    }
}

fn indicators_changed(before: &RtsStatus, after: &RtsStatus) -> bool {
    before.connection != after.connection || before.tracking != after.tracking
}

fn log_rts(key: &RtsKey, status: &RtsStatus) {
    info!(
        device_id = key.device_id,
        rts_id = key.rts_id,
        "{} Rts {} on device {}: connection {:?}, tracking {:?}",
        icon(status.connection),
        key.rts_id,
        key.device_id,
        status.connection,
        status.tracking
    );
}

fn icon(status: Status) -> &'static str {
    match status {
        Status::Success => "🟢",
        Status::Error => "🔴",
        Status::Unknown => "⚪",
    }
}
