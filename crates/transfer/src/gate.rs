//! Admission control.
//!
//! Two independent counting pools bound how many calls may do protected work
//! at once: uploads and downloads share the transfer pool, listings use their
//! own. A slot is held by an [`AdmissionTicket`] and returned when the ticket
//! is dropped, so every exit path (including errors, panics and cancelled
//! futures) frees it exactly once.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tracing::{debug, trace};

use crate::TransferError;

/// Pool a call draws its slot from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pool {
    /// Uploads and downloads.
    Transfer,
    /// Listings.
    List,
}

impl Pool {
    /// Short label used in logs and metrics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::List => "list",
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pair of fixed-capacity admission pools.
///
/// Cloning is cheap and clones share the same pools.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    transfers: Arc<Semaphore>,
    transfer_capacity: usize,
    lists: Arc<Semaphore>,
    list_capacity: usize,
}

impl AdmissionGate {
    /// Create a gate with the given pool capacities.
    pub fn new(transfer_capacity: usize, list_capacity: usize) -> Self {
        Self {
            transfers: Arc::new(Semaphore::new(transfer_capacity)),
            transfer_capacity,
            lists: Arc::new(Semaphore::new(list_capacity)),
            list_capacity,
        }
    }

    fn semaphore(&self, pool: Pool) -> &Arc<Semaphore> {
        match pool {
            Pool::Transfer => &self.transfers,
            Pool::List => &self.lists,
        }
    }

    /// Wait for a free slot in `pool` and occupy it.
    ///
    /// There is no timeout: a saturated pool keeps the caller waiting until a
    /// slot frees up or the caller's future is dropped.
    pub async fn acquire(&self, pool: Pool) -> Result<AdmissionTicket, TransferError> {
        let semaphore = self.semaphore(pool);
        if semaphore.available_permits() == 0 {
            debug!(%pool, "Admission pool saturated, waiting for a slot");
        }

        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| TransferError::GateClosed)?;

        trace!(
            %pool,
            available = semaphore.available_permits(),
            "Admission slot acquired"
        );
        Ok(AdmissionTicket {
            pool,
            _permit: permit,
        })
    }

    /// Occupy a slot in `pool` only if one is free right now.
    pub fn try_acquire(&self, pool: Pool) -> Option<AdmissionTicket> {
        match self.semaphore(pool).clone().try_acquire_owned() {
            Ok(permit) => Some(AdmissionTicket {
                pool,
                _permit: permit,
            }),
            Err(TryAcquireError::NoPermits | TryAcquireError::Closed) => None,
        }
    }

    /// Number of free slots in `pool`.
    pub fn available(&self, pool: Pool) -> usize {
        self.semaphore(pool).available_permits()
    }

    /// Configured size of `pool`.
    pub const fn capacity(&self, pool: Pool) -> usize {
        match pool {
            Pool::Transfer => self.transfer_capacity,
            Pool::List => self.list_capacity,
        }
    }
}

/// One occupied slot; released on drop.
#[must_use = "the slot is released as soon as the ticket is dropped"]
pub struct AdmissionTicket {
    pool: Pool,
    _permit: OwnedSemaphorePermit,
}

impl AdmissionTicket {
    /// Pool this ticket was drawn from.
    pub const fn pool(&self) -> Pool {
        self.pool
    }
}

impl fmt::Debug for AdmissionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionTicket").field("pool", &self.pool).finish()
    }
}
