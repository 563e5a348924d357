//! Role-scoped worker slots with bounded concurrency.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use conductor_core::{AgentRole, CapacityTable, OrchestratorError, Result, Worker};

/// Maps each role to one worker implementation and a bounded set of
/// concurrency slots sized from the capacity table.
///
/// The pool is an explicit value passed into the coordinator, never a
/// process-wide singleton, so concurrent runs never share dispatch state.
/// A slot is reserved before a task starts running and released only when
/// it reaches a terminal status, so a role's capacity can never be
/// oversubscribed.
pub struct WorkerPool {
    workers: HashMap<AgentRole, Arc<dyn Worker>>,
    slots: HashMap<AgentRole, Arc<Semaphore>>,
}

impl WorkerPool {
    /// Creates a pool with slots sized from the capacity table and no
    /// workers registered yet.
    #[must_use]
    pub fn new(capacities: &CapacityTable) -> Self {
        let slots = capacities
            .iter()
            .map(|(role, capacity)| (role, Arc::new(Semaphore::new(capacity))))
            .collect();
        Self {
            workers: HashMap::new(),
            slots,
        }
    }

    /// Registers the worker implementation for a role.
    #[must_use]
    pub fn with_worker(mut self, role: AgentRole, worker: Arc<dyn Worker>) -> Self {
        self.workers.insert(role, worker);
        self
    }

    /// Registers one worker implementation for every role in the closed
    /// set.
    #[must_use]
    pub fn with_worker_for_all(mut self, worker: Arc<dyn Worker>) -> Self {
        for role in AgentRole::ALL {
            self.workers.insert(role, Arc::clone(&worker));
        }
        self
    }

    /// The worker registered for a role.
    ///
    /// # Errors
    /// Returns an error if no worker is registered for the role.
    pub fn worker(&self, role: AgentRole) -> Result<Arc<dyn Worker>> {
        self.workers
            .get(&role)
            .cloned()
            .ok_or(OrchestratorError::WorkerMissing(role))
    }

    /// Tries to reserve a slot for a role without waiting.
    ///
    /// Returns `None` when every slot for the role is occupied; the
    /// permit releases the slot when dropped.
    ///
    /// # Errors
    /// Returns a capacity error if the role has no configured slots.
    pub fn try_reserve(&self, role: AgentRole) -> Result<Option<OwnedSemaphorePermit>> {
        let semaphore = self
            .slots
            .get(&role)
            .ok_or(OrchestratorError::Capacity(role))?;
        Ok(Arc::clone(semaphore).try_acquire_owned().ok())
    }

    /// Number of free slots currently available for a role.
    pub fn available_slots(&self, role: AgentRole) -> usize {
        self.slots
            .get(&role)
            .map_or(0, |semaphore| semaphore.available_permits())
    }
}
