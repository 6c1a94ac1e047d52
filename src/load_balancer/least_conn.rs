//! Least Connections load balancing strategy.

use std::sync::{Arc, Mutex};

use crate::load_balancer::backend::Backend;
use crate::load_balancer::pool::ServerPool;
use crate::load_balancer::LoadBalancer;

/// Least connections selector.
///
/// Stateless beyond serializing concurrent scans. The result reflects the
/// counters at the instant of the scan; a counter can move between selection
/// and the caller's own increment, so this is best-effort rather than a
/// guarantee of global minimality.
#[derive(Debug, Default)]
pub struct LeastConnections {
    lock: Mutex<()>,
}

impl LeastConnections {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for LeastConnections {
    fn next_server(&self, pool: &ServerPool) -> Option<Arc<Backend>> {
        let servers = pool.snapshot();
        if servers.is_empty() {
            return None;
        }

        let _guard = self.lock.lock().unwrap();

        // In case of tie, the first one in insertion order is selected.
        servers
            .iter()
            .filter(|server| server.is_alive())
            .min_by_key(|server| server.active_connections())
            .cloned()
    }
}
