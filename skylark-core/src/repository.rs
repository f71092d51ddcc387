use async_trait::async_trait;
use std::error::Error;
use std::time::Duration;
use uuid::Uuid;

use crate::booking::{Booking, ResourceUnit};
use crate::cabin::CabinClass;
use crate::search::{FlightSearchResult, SearchQuery};

/// Outcome of the atomic reserve-and-record transaction.
///
/// Expected business results are variants in the Ok position so every
/// caller has to match them; only infrastructure failures travel on the
/// error side.
#[derive(Debug)]
pub enum ReserveOutcome {
    /// The booking row was created and the reserved counter incremented,
    /// atomically.
    Recorded(Booking),
    /// Capacity was exhausted at transaction time.
    SoldOut,
    /// No inventory row exists for the (flight, cabin class) pair.
    NotFound,
    /// The reference collided with an existing booking; the transaction
    /// rolled back and may be retried with a fresh code.
    DuplicateReference,
}

/// Authoritative seat counters. `reserve_one` is the only mutation path.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Read the current counters for a resource unit.
    async fn find_unit(
        &self,
        flight_id: Uuid,
        cabin: CabinClass,
    ) -> Result<Option<ResourceUnit>, Box<dyn Error + Send + Sync>>;

    /// Atomically re-check capacity, record a booking under `reference`
    /// and increment the reserved counter. No intermediate state is ever
    /// observable outside the transaction.
    async fn reserve_one(
        &self,
        flight_id: Uuid,
        cabin: CabinClass,
        user_id: Uuid,
        reference: &str,
    ) -> Result<ReserveOutcome, Box<dyn Error + Send + Sync>>;
}

/// Flight search against the authoritative store.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn search_flights(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<FlightSearchResult>, Box<dyn Error + Send + Sync>>;
}

/// Key/value store with expiry for serialized search result sets.
#[async_trait]
pub trait SearchCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>>;

    async fn put(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
