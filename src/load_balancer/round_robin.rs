//! Round-robin load balancing strategy.

use std::sync::{Arc, Mutex};

use crate::load_balancer::backend::Backend;
use crate::load_balancer::pool::ServerPool;
use crate::load_balancer::LoadBalancer;

/// Round-robin selector.
///
/// The cursor advances exactly one position per scanned candidate and
/// persists across calls, so a skipped (down) backend still consumes its
/// slot and the relative order of the others is preserved.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: Mutex<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, pool: &ServerPool) -> Option<Arc<Backend>> {
        let servers = pool.snapshot();
        let n = servers.len();
        if n == 0 {
            return None;
        }

        // The lock serializes concurrent callers: no two may observe or
        // advance the same cursor value.
        let mut counter = self.counter.lock().unwrap();
        for _ in 0..n {
            let candidate = &servers[*counter % n];
            *counter = (*counter + 1) % n;
            if candidate.is_alive() {
                return Some(candidate.clone());
            }
        }

        // Scanned every candidate without finding one alive; the cursor is
        // back where it started modulo n.
        None
    }
}
