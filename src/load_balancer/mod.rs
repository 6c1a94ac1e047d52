//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → strategy.next_server(pool)
//!         - round_robin.rs (rotate through backends)
//!         - weighted_round_robin.rs (smooth weighted spread)
//!         - least_conn.rs (pick backend with fewest connections)
//!     → backend.rs (connection guard around forwarding)
//! ```
//!
//! # Design Decisions
//! - `None` from a strategy is the normal "no backend available" value; an
//!   empty pool and an all-down pool are indistinguishable to callers
//! - Each strategy serializes its own scan with its own lock; descriptor
//!   fields and the pool's structural lock are separate synchronization
//!   domains so unrelated backends' traffic never serializes through one
//!   global lock

use std::sync::Arc;

pub mod backend;
pub mod least_conn;
pub mod pool;
pub mod round_robin;
pub mod weighted_round_robin;

use backend::Backend;
use pool::ServerPool;

/// A backend selection strategy.
///
/// `next_server` takes its own snapshot of the pool and picks one alive
/// backend, or returns `None` when the pool is empty or nothing is alive.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    fn next_server(&self, pool: &ServerPool) -> Option<Arc<Backend>>;
}

/// Error for unrecognized strategy names in configuration.
#[derive(Debug, thiserror::Error)]
#[error("unknown load balancing strategy: {0}")]
pub struct UnknownStrategy(pub String);

/// Resolve a strategy by its configuration name.
pub fn strategy_from_name(name: &str) -> Result<Box<dyn LoadBalancer>, UnknownStrategy> {
    match name.trim().to_lowercase().as_str() {
        "round_robin" | "round-robin" => Ok(Box::new(round_robin::RoundRobin::new())),
        "weighted_round_robin" | "weighted-round-robin" => {
            Ok(Box::new(weighted_round_robin::WeightedRoundRobin::new()))
        }
        "least_connections" | "least-connections" => {
            Ok(Box::new(least_conn::LeastConnections::new()))
        }
        _ => Err(UnknownStrategy(name.to_string())),
    }
}
