use crate::client::RtsClient;
use crate::device_registry::SharedRegistry;
use crate::domain::{Device, DeviceCreate};
use crate::validation::{Network, ValidationError};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::fmt::Debug;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

/// Finds hosts on a network that accept connections on a port.
#[async_trait]
pub trait HostScanner: Debug + Send + Sync {
    async fn scan(&self, network: &Network, port: u16) -> Result<Vec<IpAddr>, ValidationError>;

    /// How many hosts may be contacted at once.
    fn max_concurrent(&self) -> usize;
}

/// Sweeps a network with plain TCP connects.
#[derive(Debug, Clone)]
pub struct TcpScanner {
    connect_timeout: Duration,
    max_concurrent: usize,
}

impl TcpScanner {
    pub fn new(connect_timeout: Duration, max_concurrent: usize) -> Self {
        TcpScanner {
            connect_timeout,
            max_concurrent: max_concurrent.max(1),
        }
    }
}

#[async_trait]
impl HostScanner for TcpScanner {
    async fn scan(&self, network: &Network, port: u16) -> Result<Vec<IpAddr>, ValidationError> {
        let hosts = network.hosts()?;
        let connect_timeout = self.connect_timeout;

        let mut found = stream::iter(hosts)
            .map(|ip| async move {
                match timeout(connect_timeout, TcpStream::connect(SocketAddr::new(ip, port))).await {
                    Ok(Ok(_)) => Some(ip),
                    _ => None,
                }
            })
            .buffer_unordered(self.max_concurrent)
            .filter_map(|ip| async move { ip })
            .collect::<Vec<_>>()
            .await;

        found.sort();
        Ok(found)
    }

    fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

/// Registers every host on `network` that answers the liveness probe. Devices are named after their address.
#[instrument(skip_all, fields(network = %network, port))]
pub async fn scan_for_devices(
    scanner: &dyn HostScanner,
    client: &RtsClient,
    registry: &SharedRegistry,
    network: &Network,
    port: u16,
) -> Result<Vec<Device>, ValidationError> {
    info!("📡 Scanning network {} on port {}...", network, port);
    let hosts = scanner.scan(network, port).await?;
    debug!("📡 {} host(s) accepted a connection", hosts.len());

    let candidates = hosts.into_iter().map(|ip| DeviceCreate {
        name: ip.to_string(),
        ip: ip.to_string(),
        port,
    });
    let probed = stream::iter(candidates)
        .map(|candidate| async move {
            let reachable = client.validate_device_connection(&candidate).await;
            (candidate, reachable)
        })
        .buffered(scanner.max_concurrent().max(1))
        .collect::<Vec<_>>()
        .await;

    let mut registry = registry.write().await;
    let devices = probed
        .into_iter()
        .filter(|(_, reachable)| *reachable)
        .map(|(candidate, _)| registry.insert(candidate))
        .collect::<Vec<_>>();

    info!("📡 Scanning network {} on port {}... OK, {} device(s) found", network, port, devices.len());
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpTransport;
    use crate::client::transport::{Transport, TransportError, TransportRequest, TransportResponse};
    use crate::device_registry::DeviceRegistry;
    use crate::validation::validate_network;
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use test_log::test;

    #[derive(Debug)]
    struct FixedScanner {
        hosts: Vec<IpAddr>,
        max_concurrent: usize,
    }

    #[async_trait]
    impl HostScanner for FixedScanner {
        async fn scan(&self, _network: &Network, _port: u16) -> Result<Vec<IpAddr>, ValidationError> {
            Ok(self.hosts.clone())
        }

        fn max_concurrent(&self) -> usize {
            self.max_concurrent
        }
    }

    fn client() -> RtsClient {
        RtsClient::new(
            Arc::new(HttpTransport::new(reqwest::Client::new())),
            Duration::from_millis(500),
            Duration::from_millis(250),
        )
    }

    #[test(tokio::test)]
    async fn only_hosts_that_pass_the_liveness_probe_are_registered() -> Result<(), ValidationError> {
        let mut server = mockito::Server::new_async().await;
        let _liveness = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"message": "Server is running"}"#)
            .create_async()
            .await;
        let port = server.socket_address().port();

        // Nothing listens on 127.0.0.2, so the second host is refused
        let scanner = FixedScanner {
            hosts: vec![IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2))],
            max_concurrent: 2,
        };
        let registry = DeviceRegistry::new().shared();
        let network = validate_network("127.0.0.0/30")?;

        let devices = scan_for_devices(&scanner, &client(), &registry, &network, port).await?;

        assert_eq!(
            devices,
            vec![Device {
                id: 0,
                name: "127.0.0.1".to_string(),
                ip: "127.0.0.1".to_string(),
                port,
            }]
        );
        assert_eq!(registry.read().await.list(), devices);
        Ok(())
    }

    #[test(tokio::test)]
    async fn tcp_scanner_finds_listening_hosts() -> Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let scanner = TcpScanner::new(Duration::from_millis(200), 4);

        let found = scanner.scan(&validate_network("127.0.0.1/32")?, port).await?;

        assert_eq!(found, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
        Ok(())
    }

    #[test(tokio::test)]
    async fn tcp_scanner_rejects_oversized_networks() -> Result<(), ValidationError> {
        let scanner = TcpScanner::new(Duration::from_millis(10), 4);

        let result = scanner.scan(&validate_network("10.0.0.0/8")?, 8000).await;

        assert!(matches!(result, Err(ValidationError::NetworkTooLarge(_))));
        Ok(())
    }

    #[derive(Debug)]
    struct CountingTransport {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, TransportError> {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            Ok(TransportResponse {
                status: reqwest::StatusCode::OK,
                body: br#"{"message": "Server is running"}"#.to_vec(),
            })
        }
    }

    #[test(tokio::test)]
    async fn liveness_probes_respect_the_scanner_bound() -> Result<(), ValidationError> {
        let transport = Arc::new(CountingTransport {
            active: Default::default(),
            peak: Default::default(),
        });
        let client = RtsClient::new(transport.clone(), Duration::from_millis(500), Duration::from_millis(500));
        let scanner = FixedScanner {
            hosts: (1..=8).map(|host| IpAddr::V4(Ipv4Addr::new(10, 0, 0, host))).collect(),
            max_concurrent: 3,
        };
        let registry = DeviceRegistry::new().shared();

        let devices = scan_for_devices(&scanner, &client, &registry, &validate_network("10.0.0.0/28")?, 8000).await?;

        assert_eq!(devices.len(), 8);
        assert_eq!(devices[7].name, "10.0.0.8");
        assert!(transport.peak.load(Ordering::SeqCst) <= 3);
        Ok(())
    }
}
