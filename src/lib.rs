//! Switchyard — an HTTP load balancer built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 SWITCHYARD                    │
//!                    │                                               │
//!   Client Request   │  ┌─────────┐      ┌───────────────────────┐  │
//!   ─────────────────┼─▶│  http   │─────▶│     load_balancer     │  │
//!                    │  │ server  │      │  pool + strategy       │  │
//!                    │  └────┬────┘      │  (round robin,        │  │
//!                    │       │           │   weighted, least     │  │
//!                    │       │           │   connections)        │  │
//!                    │       │           └──────────┬────────────┘  │
//!                    │       ▼                      ▼               │
//!   Client Response  │  ┌─────────┐      ┌───────────────────────┐  │
//!   ◀────────────────┼──│ stream  │◀─────│  backend connection   │◀─┼── Backend
//!                    │  │response │      │  (guarded counter)    │  │   Server
//!                    │  └─────────┘      └───────────────────────┘  │
//!                    │                                               │
//!                    │  config · observability · lifecycle           │
//!                    └──────────────────────────────────────────────┘
//! ```
//!
//! The pool and strategies are the heart of the crate: a thread-safe
//! registry of backend descriptors and three interchangeable selection
//! algorithms over it. The HTTP layer is a thin collaborator that asks the
//! active strategy for a backend and forwards bytes.

// Core subsystems
pub mod config;
pub mod http;
pub mod load_balancer;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
