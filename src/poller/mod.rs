mod poller;
mod snapshot;

pub use poller::Poller;
pub use snapshot::{RtsStatus, StatusSnapshot};
