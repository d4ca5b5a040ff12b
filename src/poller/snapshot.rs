use crate::domain::position::{apply_tracking_status, newest};
use crate::domain::{ConnectionStatus, DeviceId, Position, RtsKey, Status, TrackingStatus};
use std::collections::BTreeMap;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct RtsStatus {
    pub connection: Status,
    pub tracking: Status,
    pub positions: u64,
    pub position: Position,
}

impl RtsStatus {
    /// A failed poll leaves the held values untouched and only marks the indicator unknown.
    pub fn apply(&mut self, connection: Option<ConnectionStatus>, tracking: Option<TrackingStatus>) {
        self.connection = connection.map_or(Status::Unknown, |status| Status::from(status.connected));

        match tracking {
            Some(status) => {
                self.tracking = Status::from(status.active);
                self.positions = status.positions;
                self.position = apply_tracking_status(&self.position, &status);
            }
            None => self.tracking = Status::Unknown,
        }
    }

    pub fn mark_error(&mut self) {
        self.connection = Status::Error;
        self.tracking = Status::Error;
        self.positions = 0;
    }
}

/// Everything on display, as of the latest poll.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct StatusSnapshot {
    pub devices: BTreeMap<DeviceId, Status>,
    pub rts: BTreeMap<RtsKey, RtsStatus>,
    pub target: Position,
}

impl StatusSnapshot {
    /// Publishes the newest sample across all displayed RTS as the target.
    pub fn refresh_target(&mut self) -> bool {
        let target = newest(&self.target, self.rts.values().map(|status| &status.position));
        if target == self.target {
            return false;
        }

        self.target = target;
        true
    }
}
