use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use skylark_core::error::SearchError;
use skylark_core::repository::{FlightRepository, SearchCache};
use skylark_core::search::{FlightSearchResult, SearchQuery};

// ============================================================
// Flight Search Service
// ============================================================

/// Read-through flight search: consult the cache, fall back to the
/// store, write non-empty result sets back.
///
/// The cache is best-effort on both sides. An unreachable or corrupt
/// cache degrades to a store query, and a failed write-back never fails
/// the search. Entries are not invalidated by bookings; they age out on
/// the TTL, so availability in a search response can lag reservations by
/// up to that long.
pub struct SearchService {
    flights: Arc<dyn FlightRepository>,
    cache: Arc<dyn SearchCache>,
    cache_ttl: Duration,
}

impl SearchService {
    pub fn new(
        flights: Arc<dyn FlightRepository>,
        cache: Arc<dyn SearchCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            flights,
            cache,
            cache_ttl,
        }
    }

    pub async fn search(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<FlightSearchResult>, SearchError> {
        let key = query.cache_key();

        match self.cache.get(&key).await {
            Ok(Some(payload)) => {
                match serde_json::from_str::<Vec<FlightSearchResult>>(&payload) {
                    Ok(results) => {
                        debug!("Search cache hit: {}", key);
                        return Ok(results);
                    }
                    Err(e) => {
                        // Treat an unreadable entry as a miss; the store
                        // answer below overwrites it.
                        warn!("Discarding corrupt cache entry {}: {}", key, e);
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Search cache read failed for {}: {}", key, e);
            }
        }

        let results = self
            .flights
            .search_flights(query)
            .await
            .map_err(|e| SearchError::StoreUnavailable(e.to_string()))?;

        // Empty result sets stay uncached so newly scheduled flights show
        // up without waiting out a TTL.
        if !results.is_empty() {
            match serde_json::to_string(&results) {
                Ok(payload) => {
                    if let Err(e) = self.cache.put(&key, &payload, self.cache_ttl).await {
                        warn!("Search cache write failed for {}: {}", key, e);
                    }
                }
                Err(e) => warn!("Could not serialize search results for {}: {}", key, e),
            }
        }

        Ok(results)
    }
}
