//! Runtime execution of conductor plans.
//!
//! [`Coordinator`] walks an execution plan phase by phase, dispatching
//! ready tasks to the capacity-bounded, role-scoped slots of a
//! [`WorkerPool`], applying retry and failure-propagation rules, and
//! aggregating the final project result.

/// Plan-driving coordinator with retry and failure propagation.
pub mod coordinator;
/// Role-scoped worker slots with bounded concurrency.
pub mod pool;

pub use coordinator::Coordinator;
pub use pool::WorkerPool;
