use crate::client::RtsClient;
use crate::domain::{Device, RtsEntry};
use futures::future::join_all;
use tracing::{info, instrument};

/// Lists the RTS of every device. A device that cannot be reached contributes nothing.
#[instrument(skip_all, fields(devices = devices.len()))]
pub async fn fetch_all_rts(client: &RtsClient, devices: &[Device]) -> Vec<RtsEntry> {
    let listings = join_all(devices.iter().map(|device| async move { (device.id, client.get_rts(device).await) })).await;

    listings
        .into_iter()
        .flat_map(|(device_id, rts)| rts.into_iter().map(move |rts| RtsEntry { device_id, rts }))
        .collect()
}

#[derive(Clone, Copy, Debug)]
enum TrackingChange {
    Start,
    Stop,
}

/// Starts tracking on every RTS of every device and returns how many accepted.
pub async fn start_all(client: &RtsClient, devices: &[Device]) -> usize {
    change_all(client, devices, TrackingChange::Start).await
}

/// Stops tracking on every RTS of every device and returns how many accepted.
pub async fn stop_all(client: &RtsClient, devices: &[Device]) -> usize {
    change_all(client, devices, TrackingChange::Stop).await
}

#[instrument(skip(client, devices))]
async fn change_all(client: &RtsClient, devices: &[Device], change: TrackingChange) -> usize {
    let mut changed = 0;

    for device in devices {
        for rts in client.get_rts(device).await {
            let accepted = match change {
                TrackingChange::Start => client.start_tracking(device, rts.id).await,
                TrackingChange::Stop => client.stop_tracking(device, rts.id).await,
            };

            if accepted {
                info!(device_id = device.id, rts_id = rts.id, "🟢 {:?} tracking for rts '{}'", change, rts.name);
                changed += 1;
            }
        }
    }

    changed
}
