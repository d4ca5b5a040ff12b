use serde::Serialize;

/// What a status indicator shows for a device or RTS.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
    #[default]
    Unknown,
}

impl From<bool> for Status {
    fn from(value: bool) -> Self {
        if value { Status::Success } else { Status::Error }
    }
}
