//! Connectivity oracles

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ports::outbound::ConnectivityProvider;

/// Assumes the network is always reachable; for hosts without a reachability API.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReachable;

impl ConnectivityProvider for AlwaysReachable {
    fn is_connected_to_network(&self) -> bool {
        true
    }
}

/// Reachability flag the host updates from its own network monitor.
///
/// Clones share the flag.
#[derive(Debug, Clone)]
pub struct ManualReachability {
    connected: Arc<AtomicBool>,
}

impl ManualReachability {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(connected)),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        let previous = self.connected.swap(connected, Ordering::SeqCst);
        if previous != connected {
            tracing::debug!(connected, "Network reachability changed");
        }
    }
}

impl Default for ManualReachability {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityProvider for ManualReachability {
    fn is_connected_to_network(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
