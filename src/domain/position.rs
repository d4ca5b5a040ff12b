use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A live tracking sample. The default value is the zero sentinel shown while an RTS is not tracking.
#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
pub struct Position {
    pub timestamp: f64,
    pub device: String,
    pub pos_x: f64,
    pub pos_y: f64,
    pub pos_z: f64,
}

impl Position {
    pub fn is_newer_than(&self, other: &Position) -> bool {
        OrderedFloat(self.timestamp) > OrderedFloat(other.timestamp)
    }
}

// API: GET /tracking/status/{id}
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct TrackingStatus {
    pub active: bool,
    #[serde(default)]
    pub positions: u64,
    #[serde(default)]
    pub pos_x: f64,
    #[serde(default)]
    pub pos_y: f64,
    #[serde(default)]
    pub pos_z: f64,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub device: String,
}

impl TrackingStatus {
    pub fn position(&self) -> Position {
        Position {
            timestamp: self.timestamp,
            device: self.device.clone(),
            pos_x: self.pos_x,
            pos_y: self.pos_y,
            pos_z: self.pos_z,
        }
    }
}

// API: GET /rts/status/{id}
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
}

/// Body of PUT /rts/turnto/{id}.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Target {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<&Position> for Target {
    fn from(position: &Position) -> Self {
        Target {
            x: position.pos_x,
            y: position.pos_y,
            z: position.pos_z,
        }
    }
}

/// Keeps whichever sample is newer. Equal timestamps keep `current`.
pub fn merge(current: &Position, incoming: Position) -> Position {
    if incoming.is_newer_than(current) { incoming } else { current.clone() }
}

/// Folds a tracking status poll into the held sample. Inactive tracking resets to the zero sentinel.
pub fn apply_tracking_status(current: &Position, status: &TrackingStatus) -> Position {
    if !status.active {
        return Position::default();
    }

    merge(current, status.position())
}

/// Returns the newest of `current` and `candidates`, preferring the earliest on ties.
pub fn newest<'a>(current: &'a Position, candidates: impl IntoIterator<Item = &'a Position>) -> Position {
    candidates
        .into_iter()
        .fold(current, |best, candidate| if candidate.is_newer_than(best) { candidate } else { best })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn position(timestamp: f64, device: &str) -> Position {
        Position {
            timestamp,
            device: device.to_string(),
            pos_x: timestamp * 2.0,
            pos_y: 1.0,
            pos_z: -1.0,
        }
    }

    fn tracking_status(active: bool, timestamp: f64) -> TrackingStatus {
        TrackingStatus {
            active,
            positions: 42,
            pos_x: 1.5,
            pos_y: 2.5,
            pos_z: 3.5,
            timestamp,
            device: "rts-1".to_string(),
        }
    }

    #[rstest]
    #[case(1.0, 2.0, true)]
    #[case(2.0, 1.0, false)]
    #[case(1.0, 1.0, false)]
    #[case(0.0, 0.0, false)]
    #[case(1_700_000_000.25, 1_700_000_000.5, true)]
    #[case(f64::NAN, 1.0, false)]
    fn merge_takes_the_incoming_sample_only_when_strictly_newer(#[case] current: f64, #[case] incoming: f64, #[case] replaced: bool) {
        let current = position(current, "current");
        let incoming = position(incoming, "incoming");

        let result = merge(&current, incoming.clone());

        if replaced {
            assert_eq!(result, incoming);
        } else {
            assert_eq!(result.device, "current");
        }
    }

    #[test]
    fn inactive_tracking_resets_to_the_zero_sentinel() {
        let current = position(1_700_000_000.0, "rts-1");

        let result = apply_tracking_status(&current, &tracking_status(false, 1_800_000_000.0));

        assert_eq!(result, Position::default());
        assert_eq!(result.timestamp, 0.0);
        assert_eq!(result.device, "");
    }

    #[test]
    fn active_tracking_merges_the_reported_sample() {
        let current = position(10.0, "rts-1");

        let newer = apply_tracking_status(&current, &tracking_status(true, 11.0));
        let older = apply_tracking_status(&current, &tracking_status(true, 9.0));

        assert_eq!(newer.timestamp, 11.0);
        assert_eq!(newer.pos_x, 1.5);
        assert_eq!(older, current);
    }

    #[test]
    fn newest_picks_the_latest_candidate() {
        let candidates = vec![position(3.0, "a"), position(7.0, "b"), position(5.0, "c")];

        let result = newest(&Position::default(), &candidates);

        assert_eq!(result.device, "b");
    }

    #[test]
    fn newest_keeps_the_first_writer_on_ties() {
        let candidates = vec![position(7.0, "a"), position(7.0, "b")];

        assert_eq!(newest(&Position::default(), &candidates).device, "a");
        assert_eq!(newest(&position(7.0, "held"), &candidates).device, "held");
    }

    #[test]
    fn newest_without_candidates_keeps_the_current_target() {
        let current = position(4.0, "held");

        assert_eq!(newest(&current, &Vec::<Position>::new()), current);
    }

    #[test]
    fn tracking_status_tolerates_missing_sample_fields() -> Result<(), serde_json::Error> {
        let status: TrackingStatus = serde_json::from_str(r#"{"active": false, "positions": 0}"#)?;

        assert!(!status.active);
        assert_eq!(status.position(), Position::default());
        Ok(())
    }
}
