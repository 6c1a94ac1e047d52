//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (stamp x-request-id)
//!     → [strategy picks a backend]
//!     → server.rs (rewrite URI, forward, stream response)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
