//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses would survive registration
//! - Check the strategy name resolves
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - An empty backend list is deliberately legal: a pool with no backends is
//!   a valid runtime state that answers every request with 503

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;
use crate::load_balancer::backend::Backend;
use crate::load_balancer::strategy_from_name;

/// A single semantic problem found in a configuration.
#[derive(Debug)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidMetricsAddress(String),
    UnknownStrategy(String),
    InvalidBackendAddress { address: String, reason: String },
    WeightedStrategyWithoutWeights,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener bind address does not parse: {}", addr)
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "metrics address does not parse: {}", addr)
            }
            ValidationError::UnknownStrategy(name) => {
                write!(f, "unknown strategy: {}", name)
            }
            ValidationError::InvalidBackendAddress { address, reason } => {
                write!(f, "backend address {} is invalid: {}", address, reason)
            }
            ValidationError::WeightedStrategyWithoutWeights => {
                write!(
                    f,
                    "weighted_round_robin needs at least one backend with a weight"
                )
            }
        }
    }
}

/// Check a parsed configuration for semantic problems, accumulating every
/// error found rather than stopping at the first.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if strategy_from_name(&config.strategy).is_err() {
        errors.push(ValidationError::UnknownStrategy(config.strategy.clone()));
    }

    for backend in &config.backends {
        // Same parse the pool will run at registration time.
        if let Err(e) = Backend::new(&backend.address, backend.weight) {
            errors.push(ValidationError::InvalidBackendAddress {
                address: backend.address.clone(),
                reason: e.to_string(),
            });
        }
    }

    let is_weighted = matches!(
        config.strategy.trim().to_lowercase().as_str(),
        "weighted_round_robin" | "weighted-round-robin"
    );
    if is_weighted
        && !config.backends.is_empty()
        && config.backends.iter().all(|b| b.weight.is_none())
    {
        errors.push(ValidationError::WeightedStrategyWithoutWeights);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
