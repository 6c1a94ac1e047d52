//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Track liveness (set by administrative callers, read by every strategy)
//! - Track active connections (for Least Connections LB)
//! - Carry the running weight used by Weighted Round Robin

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// Error raised when a backend address cannot be registered.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid backend address: {0}")]
    InvalidAddress(#[from] url::ParseError),
    #[error("backend address has no host: {0}")]
    MissingHost(String),
    #[error("backend address has no port: {0}")]
    MissingPort(String),
}

/// A single backend server.
///
/// The address and weight are fixed at construction; liveness, the active
/// connection count, and the running weight are mutated over the process
/// lifetime through shared references.
#[derive(Debug)]
pub struct Backend {
    /// Parsed target address (scheme + host + port).
    pub url: Url,
    /// Static weight for weighted selection. `None` means the backend does
    /// not participate in weight accounting.
    pub weight: Option<u32>,
    /// Whether the backend should currently receive traffic.
    alive: AtomicBool,
    /// Number of in-flight requests to this backend.
    active_connections: AtomicUsize,
    /// Weighted Round Robin scratch accumulator. Not a measure of load;
    /// only written while that strategy holds its own lock.
    pub current_weight: AtomicI64,
}

impl Backend {
    /// Parse and register a backend address.
    ///
    /// Fails fast on a malformed address so a bad entry never enters the
    /// pool. The port may come from the scheme default (e.g. 80 for http).
    pub fn new(target: &str, weight: Option<u32>) -> Result<Self, BackendError> {
        let url = Url::parse(target)?;
        if url.host_str().is_none() {
            return Err(BackendError::MissingHost(target.to_string()));
        }
        if url.port_or_known_default().is_none() {
            return Err(BackendError::MissingPort(target.to_string()));
        }
        Ok(Self {
            url,
            weight,
            alive: AtomicBool::new(true),
            active_connections: AtomicUsize::new(0),
            current_weight: AtomicI64::new(0),
        })
    }

    /// `host:port` form used when rewriting request URIs.
    pub fn authority(&self) -> String {
        // new() guarantees host and port are present
        format!(
            "{}:{}",
            self.url.host_str().unwrap_or_default(),
            self.url.port_or_known_default().unwrap_or_default()
        )
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Relaxed);
    }

    /// Get the current number of active connections.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Increment active connection count.
    pub fn inc_connections(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement active connection count. Saturates at zero so the counter
    /// never goes negative, even against a stray double-decrement.
    pub fn dec_connections(&self) {
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(n.saturating_sub(1))
            });
    }

    /// Create a guard holding one connection slot for an in-flight request.
    ///
    /// The count is incremented now and decremented when the guard drops,
    /// so forwarding failures and cancellations can't leak a slot.
    pub fn create_guard(self: &Arc<Self>) -> BackendConnectionGuard {
        self.inc_connections();
        BackendConnectionGuard {
            backend: self.clone(),
        }
    }
}

/// A RAII guard that manages the active connection count.
#[derive(Debug)]
pub struct BackendConnectionGuard {
    backend: Arc<Backend>,
}

impl BackendConnectionGuard {
    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }
}

impl Deref for BackendConnectionGuard {
    type Target = Backend;
    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

impl Drop for BackendConnectionGuard {
    fn drop(&mut self) {
        self.backend.dec_connections();
    }
}
