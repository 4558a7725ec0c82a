use crate::errors::DiscoveryError;
use crate::model::Reachability;
use crate::net;
use crate::probe::Prober;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::Arc;

/// Bounded-concurrency reachability sweep over an address range.
///
/// At most `max_concurrent` probes are in flight at once; the returned set is
/// exactly the addresses whose probe came back reachable, independent of
/// completion order.
pub struct Sweeper {
    prober: Arc<dyn Prober>,
    max_concurrent: usize,
}

impl Sweeper {
    pub fn new(prober: Arc<dyn Prober>, max_concurrent: usize) -> Self {
        Self {
            prober,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Probe every address in the list and collect the reachable ones.
    /// Unresponsive hosts and probe errors never abort the sweep.
    pub async fn sweep(&self, addresses: &[IpAddr]) -> BTreeSet<IpAddr> {
        stream::iter(addresses.iter().copied())
            .map(|address| {
                let prober = self.prober.clone();
                async move {
                    match prober.probe(address).await {
                        Ok(Reachability::Reachable) => Some(address),
                        Ok(Reachability::Unreachable) => None,
                        Err(e) => {
                            tracing::debug!(%address, error = %e, "Probe failed, treating as unreachable");
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.max_concurrent)
            .filter_map(|result| async move { result })
            .collect()
            .await
    }

    /// Sweep all host addresses of a CIDR subnet
    pub async fn sweep_subnet(&self, subnet: &str) -> Result<BTreeSet<IpAddr>, DiscoveryError> {
        let hosts = net::subnet_hosts(subnet)?;
        tracing::debug!(subnet, hosts = hosts.len(), "Starting sweep");
        Ok(self.sweep(&hosts).await)
    }
}
