//! Smooth weighted round-robin load balancing strategy.
//!
//! Heavier-weighted backends win proportionally more selections without
//! winning them in bursts: every scan adds each backend's weight to its
//! running weight, the largest running weight wins, and the winner is
//! pulled back down by the sum of all weights.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use crate::load_balancer::backend::Backend;
use crate::load_balancer::pool::ServerPool;
use crate::load_balancer::LoadBalancer;

/// Smooth weighted round-robin selector.
///
/// Carries no cursor of its own: the persistent state is each backend's
/// `current_weight`. The strategy-wide lock is load-bearing — the scan must
/// see and update a consistent set of running weights, so per-descriptor
/// locking would corrupt the spread.
#[derive(Debug, Default)]
pub struct WeightedRoundRobin {
    lock: Mutex<()>,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for WeightedRoundRobin {
    fn next_server(&self, pool: &ServerPool) -> Option<Arc<Backend>> {
        let servers = pool.snapshot();
        if servers.is_empty() {
            return None;
        }

        let _guard = self.lock.lock().unwrap();

        let mut total_weight: i64 = 0;
        let mut max_weight: i64 = 0;
        let mut best: Option<&Arc<Backend>> = None;

        for server in &servers {
            if !server.is_alive() {
                // One down backend disables weighted selection for the whole
                // pool. TODO: skip dead backends instead of bailing out.
                return None;
            }
            let Some(weight) = server.weight else {
                // Unweighted backends take no part in weight accounting.
                continue;
            };
            let weight = i64::from(weight);

            let current = server.current_weight.fetch_add(weight, Ordering::Relaxed) + weight;
            total_weight += weight;

            // Strictly greater: ties keep the earlier-seen candidate.
            if current > max_weight {
                max_weight = current;
                best = Some(server);
            }
        }

        let best = best?;
        best.current_weight.fetch_sub(total_weight, Ordering::Relaxed);
        Some(best.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted_pool(weights: &[u32]) -> ServerPool {
        let pool = ServerPool::new();
        for (i, weight) in weights.iter().enumerate() {
            let address = format!("http://127.0.0.1:{}", 8081 + i as u16);
            pool.add_server(Arc::new(Backend::new(&address, Some(*weight)).unwrap()));
        }
        pool
    }

    fn port(backend: &Backend) -> u16 {
        backend.url.port_or_known_default().unwrap()
    }

    #[test]
    fn test_distribution_follows_weights() {
        let pool = weighted_pool(&[5, 3, 2]);
        let lb = WeightedRoundRobin::new();

        let mut counts = [0usize; 3];
        for _ in 0..100 {
            let picked = port(&lb.next_server(&pool).unwrap());
            counts[(picked - 8081) as usize] += 1;
        }
        assert_eq!(counts, [50, 30, 20]);
    }

    #[test]
    fn test_selection_is_interleaved() {
        let pool = weighted_pool(&[5, 3, 2]);
        let lb = WeightedRoundRobin::new();

        // The heaviest backend must not take its whole share as one streak.
        let picks: Vec<u16> = (0..20).map(|_| port(&lb.next_server(&pool).unwrap())).collect();
        let mut longest_streak = 1;
        let mut streak = 1;
        for pair in picks.windows(2) {
            if pair[0] == pair[1] {
                streak += 1;
                longest_streak = longest_streak.max(streak);
            } else {
                streak = 1;
            }
        }
        assert!(
            longest_streak <= 2,
            "expected interleaved selections, got streak of {} in {:?}",
            longest_streak,
            picks
        );
    }

    #[test]
    fn test_single_server_takes_everything() {
        let pool = weighted_pool(&[10]);
        let lb = WeightedRoundRobin::new();
        for _ in 0..50 {
            assert_eq!(port(&lb.next_server(&pool).unwrap()), 8081);
        }
    }

    #[test]
    fn test_zero_weight_backend_is_starved() {
        let pool = weighted_pool(&[1, 0]);
        let lb = WeightedRoundRobin::new();

        let mut counts = [0usize; 2];
        for _ in 0..20 {
            let picked = port(&lb.next_server(&pool).unwrap());
            counts[(picked - 8081) as usize] += 1;
        }
        assert!(counts[0] >= 18, "distribution was {:?}", counts);
        assert!(counts[1] <= 2, "distribution was {:?}", counts);
    }

    #[test]
    fn test_any_down_backend_blocks_selection() {
        let pool = weighted_pool(&[5, 3, 2]);
        pool.snapshot()[2].set_alive(false);
        let lb = WeightedRoundRobin::new();

        // The two alive backends are not enough: one down backend gates the
        // whole pool.
        for _ in 0..10 {
            assert!(lb.next_server(&pool).is_none());
        }
    }

    #[test]
    fn test_empty_pool() {
        let pool = ServerPool::new();
        let lb = WeightedRoundRobin::new();
        assert!(lb.next_server(&pool).is_none());
    }

    #[test]
    fn test_all_servers_down() {
        let pool = weighted_pool(&[5]);
        pool.snapshot()[0].set_alive(false);
        let lb = WeightedRoundRobin::new();
        assert!(lb.next_server(&pool).is_none());
    }

    #[test]
    fn test_unweighted_backends_are_ignored() {
        let pool = ServerPool::new();
        pool.add_server(Arc::new(
            Backend::new("http://127.0.0.1:8081", Some(3)).unwrap(),
        ));
        pool.add_server(Arc::new(Backend::new("http://127.0.0.1:8082", None).unwrap()));
        let lb = WeightedRoundRobin::new();

        for _ in 0..10 {
            assert_eq!(port(&lb.next_server(&pool).unwrap()), 8081);
        }
    }

    #[test]
    fn test_no_weighted_backends_yields_none() {
        let pool = ServerPool::new();
        pool.add_server(Arc::new(Backend::new("http://127.0.0.1:8081", None).unwrap()));
        let lb = WeightedRoundRobin::new();
        assert!(lb.next_server(&pool).is_none());
    }
}
