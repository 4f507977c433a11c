//! Transfer metrics

use core::fmt;
use metrics::{Counter, Gauge};

use crate::Pool;

/// Transfer metrics
#[derive(Clone, Debug)]
pub(crate) struct TransferMetrics {
    /// Number of completed uploads
    pub(crate) uploads_total: Counter,
    /// Number of uploads that ended in an error
    pub(crate) failed_uploads_total: Counter,
    /// Number of started downloads
    pub(crate) downloads_total: Counter,
    /// Number of served listings
    pub(crate) listings_total: Counter,
    /// Bytes written to the store by uploads
    pub(crate) bytes_received_total: Counter,
    /// Bytes read from the store by downloads
    pub(crate) bytes_sent_total: Counter,
    /// Calls holding a transfer slot
    active_transfers: Gauge,
    /// Calls holding a listing slot
    active_listings: Gauge,
}

impl Default for TransferMetrics {
    fn default() -> Self {
        Self {
            uploads_total: metrics::counter!("transfer.uploads_total"),
            failed_uploads_total: metrics::counter!("transfer.failed_uploads_total"),
            downloads_total: metrics::counter!("transfer.downloads_total"),
            listings_total: metrics::counter!("transfer.listings_total"),
            bytes_received_total: metrics::counter!("transfer.bytes_received_total"),
            bytes_sent_total: metrics::counter!("transfer.bytes_sent_total"),
            active_transfers: metrics::gauge!("transfer.active", "pool" => "transfer"),
            active_listings: metrics::gauge!("transfer.active", "pool" => "list"),
        }
    }
}

impl TransferMetrics {
    /// Mark a call as active in `pool` until the returned guard drops.
    pub(crate) fn track_active(&self, pool: Pool) -> ActiveOnDrop {
        let gauge = match pool {
            Pool::Transfer => self.active_transfers.clone(),
            Pool::List => self.active_listings.clone(),
        };
        ActiveOnDrop::new(gauge)
    }
}

/// Helper type keeping a gauge raised while a call runs, even if it fails
pub(crate) struct ActiveOnDrop(Gauge);

impl fmt::Debug for ActiveOnDrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActiveOnDrop").finish()
    }
}

impl ActiveOnDrop {
    fn new(gauge: Gauge) -> Self {
        gauge.increment(1.0);
        Self(gauge)
    }
}

impl Drop for ActiveOnDrop {
    /// Lower the gauge when the call ends.
    fn drop(&mut self) {
        self.0.decrement(1.0);
    }
}
