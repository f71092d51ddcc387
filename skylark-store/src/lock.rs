use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use skylark_core::lock::{Lease, LockError, LockPolicy, LockService};

use crate::redis_repo::RedisClient;

/// Redis-backed implementation of [`LockService`]: SET NX PX with a
/// random holder token, a bounded retry loop, and a compare-and-delete
/// release.
///
/// A backend error during an attempt counts as a failed attempt rather
/// than aborting the loop; once the attempts run out the caller sees
/// `Busy` either way.
pub struct RedisLockService {
    client: RedisClient,
    policy: LockPolicy,
}

impl RedisLockService {
    pub fn new(client: RedisClient, policy: LockPolicy) -> Self {
        Self { client, policy }
    }
}

#[async_trait]
impl LockService for RedisLockService {
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<Lease, LockError> {
        let token = Uuid::new_v4().to_string();
        let attempts = self.policy.attempts();

        for attempt in 1..=attempts {
            match self.client.try_acquire(key, &token, ttl).await {
                Ok(true) => {
                    debug!("Lease acquired: {} (attempt {})", key, attempt);
                    return Ok(Lease {
                        key: key.to_string(),
                        token,
                        ttl,
                    });
                }
                Ok(false) => {
                    debug!("Lease held elsewhere: {} (attempt {})", key, attempt);
                }
                Err(e) => {
                    warn!("Lease attempt {} failed for {}: {}", attempt, key, e);
                }
            }

            if attempt < attempts {
                sleep(self.policy.retry_delay).await;
            }
        }

        Err(LockError::Busy {
            key: key.to_string(),
            attempts,
        })
    }

    async fn release(&self, lease: &Lease) -> Result<(), LockError> {
        let deleted = self
            .client
            .release_lock(&lease.key, &lease.token)
            .await
            .map_err(|e| LockError::Backend(e.to_string()))?;

        if !deleted {
            // Expired or already released; nothing to undo.
            debug!("Lease {} was no longer held at release", lease.key);
        }
        Ok(())
    }
}
