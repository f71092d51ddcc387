use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::cabin::CabinClass;

/// A time-bounded mutual-exclusion grant over one resource key.
///
/// `token` identifies the holder: release is compare-and-delete on it, so
/// a lease that expired and was re-acquired by another caller cannot be
/// deleted by the original holder.
#[derive(Debug, Clone)]
pub struct Lease {
    pub key: String,
    pub token: String,
    pub ttl: Duration,
}

/// Acquisition retry policy. `retry_count` counts re-attempts after the
/// initial try, matching the Redlock-style client the booking flow was
/// built around (3 retries, 200ms apart by default).
#[derive(Debug, Clone)]
pub struct LockPolicy {
    pub retry_count: u32,
    pub retry_delay: Duration,
}

impl LockPolicy {
    /// Total acquisition attempts including the initial one.
    pub fn attempts(&self) -> u32 {
        self.retry_count + 1
    }
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            retry_count: 3,
            retry_delay: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// The key stayed held (or the backend stayed unreachable) for every
    /// bounded attempt.
    #[error("lease busy for {key} after {attempts} attempts")]
    Busy { key: String, attempts: u32 },

    #[error("lock backend error: {0}")]
    Backend(String),
}

/// Mutual exclusion leases keyed by resource identifier.
#[async_trait]
pub trait LockService: Send + Sync {
    /// Acquire a lease on `key`, retrying per the implementation's policy
    /// before signalling `LockError::Busy`. A successful acquisition must
    /// eventually expire on its own (TTL) if never released.
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<Lease, LockError>;

    /// Release a held lease. Idempotent: releasing an expired or already
    /// released lease succeeds without effect.
    async fn release(&self, lease: &Lease) -> Result<(), LockError>;
}

/// Lease key for one bookable resource unit. Cabin classes map to
/// distinct keys so bookings in different cabins on the same flight never
/// contend.
pub fn lease_key(flight_id: Uuid, cabin: CabinClass) -> String {
    format!("lock:flight:{}:{}", flight_id, cabin)
}
