use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use skylark_core::booking::Booking;
use skylark_core::cabin::CabinClass;
use skylark_core::error::BookingError;
use skylark_core::lock::{lease_key, LockService};
use skylark_core::reference::ReferenceSource;
use skylark_core::repository::{InventoryRepository, ReserveOutcome};

// ============================================================
// Reservation Coordinator
// ============================================================

/// Drives the reservation flow for one seat: lease the resource unit,
/// check capacity, record the booking atomically, release the lease.
///
/// All collaborators are injected as trait objects; the coordinator owns
/// the sequencing and the retry budget for reference collisions, nothing
/// else.
pub struct ReservationCoordinator {
    locks: Arc<dyn LockService>,
    inventory: Arc<dyn InventoryRepository>,
    references: Arc<dyn ReferenceSource>,
    lease_ttl: Duration,
    reference_attempts: u32,
}

impl ReservationCoordinator {
    pub fn new(
        locks: Arc<dyn LockService>,
        inventory: Arc<dyn InventoryRepository>,
        references: Arc<dyn ReferenceSource>,
        lease_ttl: Duration,
        reference_attempts: u32,
    ) -> Self {
        Self {
            locks,
            inventory,
            references,
            lease_ttl,
            reference_attempts,
        }
    }

    /// Reserve one seat for `user_id` in the given cabin.
    ///
    /// The whole flow runs under a per-(flight, cabin) lease, and the
    /// lease is released before returning no matter how the reservation
    /// itself came out. A release failure is only logged: the TTL cleans
    /// up behind us.
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        flight_id: Uuid,
        cabin: CabinClass,
    ) -> Result<Booking, BookingError> {
        let key = lease_key(flight_id, cabin);
        let lease = self.locks.acquire(&key, self.lease_ttl).await.map_err(|e| {
            warn!("Could not acquire lease {}: {}", key, e);
            BookingError::LockBusy
        })?;

        let result = self.reserve(user_id, flight_id, cabin).await;

        if let Err(e) = self.locks.release(&lease).await {
            warn!("Failed to release lease {}: {}", lease.key, e);
        }

        result
    }

    async fn reserve(
        &self,
        user_id: Uuid,
        flight_id: Uuid,
        cabin: CabinClass,
    ) -> Result<Booking, BookingError> {
        let unit = self
            .inventory
            .find_unit(flight_id, cabin)
            .await
            .map_err(|e| BookingError::StoreUnavailable(e.to_string()))?
            .ok_or(BookingError::ResourceNotFound)?;

        if unit.is_sold_out() {
            return Err(BookingError::SoldOut(cabin));
        }

        // The store re-checks the reference for uniqueness; on a collision
        // the transaction rolls back and we try again with a fresh code.
        for attempt in 1..=self.reference_attempts {
            let reference = self.references.generate();

            let outcome = self
                .inventory
                .reserve_one(flight_id, cabin, user_id, &reference)
                .await
                .map_err(|e| BookingError::StoreUnavailable(e.to_string()))?;

            match outcome {
                ReserveOutcome::Recorded(booking) => {
                    info!(
                        "Booking confirmed: {} (flight {} {} for user {})",
                        booking.reference, flight_id, cabin, user_id
                    );
                    return Ok(booking);
                }
                ReserveOutcome::SoldOut => return Err(BookingError::SoldOut(cabin)),
                ReserveOutcome::NotFound => return Err(BookingError::ResourceNotFound),
                ReserveOutcome::DuplicateReference => {
                    warn!(
                        "Booking reference collision on attempt {} of {}",
                        attempt, self.reference_attempts
                    );
                }
            }
        }

        Err(BookingError::ReferenceCollision {
            attempts: self.reference_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use skylark_core::booking::{BookingStatus, ResourceUnit};
    use skylark_core::lock::{Lease, LockError};
    use skylark_core::reference::PnrGenerator;
    use std::collections::{HashMap, VecDeque};
    use std::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::{Barrier, Mutex, OwnedMutexGuard};
    use tokio::time::timeout;

    /// Grants leases by awaiting a per-key async mutex, so contending
    /// callers genuinely block until the holder releases.
    #[derive(Default)]
    struct BlockingLockFake {
        keys: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
        held: StdMutex<HashMap<String, OwnedMutexGuard<()>>>,
    }

    impl BlockingLockFake {
        fn held_leases(&self) -> usize {
            self.held.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LockService for BlockingLockFake {
        async fn acquire(&self, key: &str, ttl: Duration) -> Result<Lease, LockError> {
            let mutex = {
                let mut keys = self.keys.lock().unwrap();
                keys.entry(key.to_string()).or_default().clone()
            };
            let guard = mutex.lock_owned().await;
            let token = Uuid::new_v4().to_string();
            self.held.lock().unwrap().insert(token.clone(), guard);
            Ok(Lease {
                key: key.to_string(),
                token,
                ttl,
            })
        }

        async fn release(&self, lease: &Lease) -> Result<(), LockError> {
            // Dropping the guard unblocks the next waiter. Unknown tokens
            // are a no-op, matching the idempotent contract.
            self.held.lock().unwrap().remove(&lease.token);
            Ok(())
        }
    }

    struct RejectingLockFake;

    #[async_trait]
    impl LockService for RejectingLockFake {
        async fn acquire(&self, key: &str, _ttl: Duration) -> Result<Lease, LockError> {
            Err(LockError::Busy {
                key: key.to_string(),
                attempts: 4,
            })
        }

        async fn release(&self, _lease: &Lease) -> Result<(), LockError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeState {
        units: HashMap<(Uuid, CabinClass), ResourceUnit>,
        bookings: Vec<Booking>,
    }

    /// In-memory stand-in for the transactional store: capacity and
    /// duplicate checks happen inside one critical section, and a rejected
    /// reservation changes nothing.
    struct InventoryFake {
        state: Mutex<FakeState>,
        reserve_calls: AtomicUsize,
        gate: Option<Arc<Barrier>>,
    }

    impl InventoryFake {
        fn new() -> Self {
            Self {
                state: Mutex::new(FakeState::default()),
                reserve_calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn with_gate(gate: Arc<Barrier>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new()
            }
        }

        async fn add_unit(&self, flight_id: Uuid, cabin: CabinClass, total: i32, booked: i32) {
            let mut state = self.state.lock().await;
            state.units.insert(
                (flight_id, cabin),
                ResourceUnit {
                    id: Uuid::new_v4(),
                    flight_id,
                    cabin_class: cabin,
                    total_seats: total,
                    booked_seats: booked,
                    version: 0,
                },
            );
        }

        /// Seed an existing booking so a scripted reference can collide.
        async fn add_booking_reference(&self, reference: &str) {
            let mut state = self.state.lock().await;
            state.bookings.push(Booking {
                id: Uuid::new_v4(),
                reference: reference.to_string(),
                user_id: Uuid::new_v4(),
                flight_id: Uuid::new_v4(),
                cabin_class: CabinClass::Economy,
                status: BookingStatus::Confirmed,
                created_at: Utc::now(),
            });
        }

        async fn booked_seats(&self, flight_id: Uuid, cabin: CabinClass) -> i32 {
            let state = self.state.lock().await;
            state.units[&(flight_id, cabin)].booked_seats
        }

        async fn booking_count(&self) -> usize {
            self.state.lock().await.bookings.len()
        }

        fn reserve_calls(&self) -> usize {
            self.reserve_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InventoryRepository for InventoryFake {
        async fn find_unit(
            &self,
            flight_id: Uuid,
            cabin: CabinClass,
        ) -> Result<Option<ResourceUnit>, Box<dyn Error + Send + Sync>> {
            let state = self.state.lock().await;
            Ok(state.units.get(&(flight_id, cabin)).cloned())
        }

        async fn reserve_one(
            &self,
            flight_id: Uuid,
            cabin: CabinClass,
            user_id: Uuid,
            reference: &str,
        ) -> Result<ReserveOutcome, Box<dyn Error + Send + Sync>> {
            self.reserve_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.wait().await;
            }

            let mut state = self.state.lock().await;
            match state.units.get(&(flight_id, cabin)) {
                None => return Ok(ReserveOutcome::NotFound),
                Some(unit) if unit.is_sold_out() => return Ok(ReserveOutcome::SoldOut),
                Some(_) => {}
            }
            if state.bookings.iter().any(|b| b.reference == reference) {
                return Ok(ReserveOutcome::DuplicateReference);
            }

            let booking = Booking {
                id: Uuid::new_v4(),
                reference: reference.to_string(),
                user_id,
                flight_id,
                cabin_class: cabin,
                status: BookingStatus::Confirmed,
                created_at: Utc::now(),
            };
            state.bookings.push(booking.clone());
            if let Some(unit) = state.units.get_mut(&(flight_id, cabin)) {
                unit.booked_seats += 1;
            }
            Ok(ReserveOutcome::Recorded(booking))
        }
    }

    struct ScriptedReferences {
        codes: StdMutex<VecDeque<&'static str>>,
    }

    impl ScriptedReferences {
        fn new(codes: &[&'static str]) -> Self {
            Self {
                codes: StdMutex::new(codes.iter().copied().collect()),
            }
        }
    }

    impl ReferenceSource for ScriptedReferences {
        fn generate(&self) -> String {
            self.codes
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted reference exhausted")
                .to_string()
        }
    }

    fn coordinator(
        locks: Arc<dyn LockService>,
        inventory: Arc<dyn InventoryRepository>,
        references: Arc<dyn ReferenceSource>,
    ) -> ReservationCoordinator {
        ReservationCoordinator::new(locks, inventory, references, Duration::from_secs(5), 3)
    }

    #[tokio::test]
    async fn test_concurrent_requests_for_last_seat() {
        let locks = Arc::new(BlockingLockFake::default());
        let inventory = Arc::new(InventoryFake::new());
        let flight_id = Uuid::new_v4();
        inventory.add_unit(flight_id, CabinClass::Economy, 1, 0).await;

        let coordinator = Arc::new(coordinator(
            locks.clone(),
            inventory.clone(),
            Arc::new(PnrGenerator::default()),
        ));

        let first = tokio::spawn({
            let c = coordinator.clone();
            async move { c.create_booking(Uuid::new_v4(), flight_id, CabinClass::Economy).await }
        });
        let second = tokio::spawn({
            let c = coordinator.clone();
            async move { c.create_booking(Uuid::new_v4(), flight_id, CabinClass::Economy).await }
        });

        let results = [first.await.unwrap(), second.await.unwrap()];
        let confirmed = results.iter().filter(|r| r.is_ok()).count();
        let sold_out = results
            .iter()
            .filter(|r| matches!(r, Err(BookingError::SoldOut(_))))
            .count();

        assert_eq!(confirmed, 1);
        assert_eq!(sold_out, 1);
        assert_eq!(inventory.booked_seats(flight_id, CabinClass::Economy).await, 1);
        assert_eq!(inventory.booking_count().await, 1);
        assert_eq!(locks.held_leases(), 0);
    }

    #[tokio::test]
    async fn test_requests_beyond_capacity_are_rejected() {
        let locks = Arc::new(BlockingLockFake::default());
        let inventory = Arc::new(InventoryFake::new());
        let flight_id = Uuid::new_v4();
        inventory.add_unit(flight_id, CabinClass::Business, 2, 0).await;

        let coordinator = coordinator(
            locks.clone(),
            inventory.clone(),
            Arc::new(PnrGenerator::default()),
        );

        let first = coordinator
            .create_booking(Uuid::new_v4(), flight_id, CabinClass::Business)
            .await
            .expect("seat 1 of 2");
        let second = coordinator
            .create_booking(Uuid::new_v4(), flight_id, CabinClass::Business)
            .await
            .expect("seat 2 of 2");
        let third = coordinator
            .create_booking(Uuid::new_v4(), flight_id, CabinClass::Business)
            .await;

        assert_ne!(first.reference, second.reference);
        assert!(matches!(third, Err(BookingError::SoldOut(CabinClass::Business))));
        assert_eq!(inventory.booked_seats(flight_id, CabinClass::Business).await, 2);
    }

    #[tokio::test]
    async fn test_unavailable_lock_reports_busy_and_touches_nothing() {
        let inventory = Arc::new(InventoryFake::new());
        let flight_id = Uuid::new_v4();
        inventory.add_unit(flight_id, CabinClass::Economy, 5, 0).await;

        let coordinator = coordinator(
            Arc::new(RejectingLockFake),
            inventory.clone(),
            Arc::new(PnrGenerator::default()),
        );

        let result = coordinator
            .create_booking(Uuid::new_v4(), flight_id, CabinClass::Economy)
            .await;

        assert!(matches!(result, Err(BookingError::LockBusy)));
        assert_eq!(inventory.reserve_calls(), 0);
        assert_eq!(inventory.booked_seats(flight_id, CabinClass::Economy).await, 0);
    }

    #[tokio::test]
    async fn test_cabins_reserve_independently() {
        let locks = Arc::new(BlockingLockFake::default());
        let inventory = Arc::new(InventoryFake::with_gate(Arc::new(Barrier::new(2))));
        let flight_id = Uuid::new_v4();
        inventory.add_unit(flight_id, CabinClass::Economy, 1, 0).await;
        inventory.add_unit(flight_id, CabinClass::Business, 1, 0).await;

        let coordinator = Arc::new(coordinator(
            locks,
            inventory.clone(),
            Arc::new(PnrGenerator::default()),
        ));

        // Both reservations must be inside the store at the same moment to
        // clear the barrier; a shared lease would deadlock here.
        let economy = tokio::spawn({
            let c = coordinator.clone();
            async move { c.create_booking(Uuid::new_v4(), flight_id, CabinClass::Economy).await }
        });
        let business = tokio::spawn({
            let c = coordinator.clone();
            async move { c.create_booking(Uuid::new_v4(), flight_id, CabinClass::Business).await }
        });

        let (economy, business) = timeout(Duration::from_secs(5), async {
            (economy.await.unwrap(), business.await.unwrap())
        })
        .await
        .expect("leases for different cabins must not contend");

        assert!(economy.is_ok());
        assert!(business.is_ok());
    }

    #[tokio::test]
    async fn test_reference_collision_retries_with_fresh_code() {
        let locks = Arc::new(BlockingLockFake::default());
        let inventory = Arc::new(InventoryFake::new());
        let flight_id = Uuid::new_v4();
        inventory.add_unit(flight_id, CabinClass::Economy, 5, 0).await;
        inventory.add_booking_reference("AB12CD").await;

        let references = Arc::new(ScriptedReferences::new(&["AB12CD", "AB12CD", "ZZ99XX"]));
        let coordinator = coordinator(locks, inventory.clone(), references);

        let booking = coordinator
            .create_booking(Uuid::new_v4(), flight_id, CabinClass::Economy)
            .await
            .expect("third reference is fresh");

        assert_eq!(booking.reference, "ZZ99XX");
        assert_eq!(inventory.reserve_calls(), 3);
        assert_eq!(inventory.booked_seats(flight_id, CabinClass::Economy).await, 1);
    }

    #[tokio::test]
    async fn test_reference_exhaustion_leaves_no_partial_state() {
        let locks = Arc::new(BlockingLockFake::default());
        let inventory = Arc::new(InventoryFake::new());
        let flight_id = Uuid::new_v4();
        inventory.add_unit(flight_id, CabinClass::Economy, 5, 0).await;
        inventory.add_booking_reference("AB12CD").await;

        let references = Arc::new(ScriptedReferences::new(&["AB12CD", "AB12CD", "AB12CD"]));
        let coordinator = coordinator(locks.clone(), inventory.clone(), references);

        let result = coordinator
            .create_booking(Uuid::new_v4(), flight_id, CabinClass::Economy)
            .await;

        assert!(matches!(
            result,
            Err(BookingError::ReferenceCollision { attempts: 3 })
        ));
        assert_eq!(inventory.reserve_calls(), 3);
        assert_eq!(inventory.booked_seats(flight_id, CabinClass::Economy).await, 0);
        // Only the seeded booking remains.
        assert_eq!(inventory.booking_count().await, 1);
        assert_eq!(locks.held_leases(), 0);
    }

    #[tokio::test]
    async fn test_sold_out_rejected_before_generating_references() {
        let locks = Arc::new(BlockingLockFake::default());
        let inventory = Arc::new(InventoryFake::new());
        let flight_id = Uuid::new_v4();
        inventory.add_unit(flight_id, CabinClass::First, 1, 1).await;

        // An empty script panics on use, so this also proves no reference
        // is generated for a sold-out unit.
        let references = Arc::new(ScriptedReferences::new(&[]));
        let coordinator = coordinator(locks.clone(), inventory.clone(), references);

        let result = coordinator
            .create_booking(Uuid::new_v4(), flight_id, CabinClass::First)
            .await;

        assert!(matches!(result, Err(BookingError::SoldOut(CabinClass::First))));
        assert_eq!(inventory.reserve_calls(), 0);
        assert_eq!(locks.held_leases(), 0);
    }

    #[tokio::test]
    async fn test_unknown_unit_is_rejected() {
        let locks = Arc::new(BlockingLockFake::default());
        let inventory = Arc::new(InventoryFake::new());

        let coordinator = coordinator(
            locks.clone(),
            inventory.clone(),
            Arc::new(PnrGenerator::default()),
        );

        let result = coordinator
            .create_booking(Uuid::new_v4(), Uuid::new_v4(), CabinClass::Economy)
            .await;

        assert!(matches!(result, Err(BookingError::ResourceNotFound)));
        assert_eq!(locks.held_leases(), 0);
    }
}
