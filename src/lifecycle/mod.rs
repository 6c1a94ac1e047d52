//! Lifecycle management subsystem.
//!
//! Startup order lives in `main`: config first, then the pool and strategy,
//! listeners last. Shutdown is coordinated here.

pub mod shutdown;

pub use shutdown::Shutdown;
