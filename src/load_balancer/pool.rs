//! Backend pool management.
//!
//! # Responsibilities
//! - Hold the ordered registry of backends
//! - Hand out snapshots for strategy scans
//!
//! # Design Decisions
//! - Insertion order is significant (the round-robin cursor indexes into it)
//!   and stable: there is no removal API
//! - The structural lock guards only the sequence itself; descriptor fields
//!   carry their own synchronization, so a snapshot never blocks another
//!   request's counter updates
//! - Duplicate addresses are allowed and treated as distinct entries

use std::sync::{Arc, RwLock};

use crate::config::BackendConfig;
use crate::load_balancer::backend::{Backend, BackendError};

/// Ordered, append-only registry of backends shared by all request handlers.
#[derive(Debug, Default)]
pub struct ServerPool {
    servers: RwLock<Vec<Arc<Backend>>>,
}

impl ServerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from configuration, registering backends in order.
    ///
    /// The first malformed address aborts the whole build; a bad entry must
    /// never make it into the pool.
    pub fn from_config(configs: &[BackendConfig]) -> Result<Self, BackendError> {
        let pool = Self::new();
        for config in configs {
            let backend = Backend::new(&config.address, config.weight)?;
            pool.add_server(Arc::new(backend));
        }
        Ok(pool)
    }

    /// Append a backend to the registry.
    pub fn add_server(&self, backend: Arc<Backend>) {
        self.servers.write().unwrap().push(backend);
    }

    /// Clone the current ordered sequence of backends.
    ///
    /// The read lock is held only while the `Arc`s are copied out, so
    /// strategies never hold it while reading or mutating descriptor state.
    pub fn snapshot(&self) -> Vec<Arc<Backend>> {
        self.servers.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.servers.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
