use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cabin::CabinClass;
use crate::error::SearchError;

/// Normalized flight search input: uppercase IATA codes plus a calendar
/// day. All cache keys and store queries derive from this form, never
/// from raw request strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
}

impl SearchQuery {
    /// Normalize raw request inputs. Timestamps are truncated to their
    /// calendar day, so "2026-02-06T09:30:00Z" and "2026-02-06" resolve
    /// to the same query and the same cache entry.
    pub fn parse(origin: &str, destination: &str, date: &str) -> Result<Self, SearchError> {
        let origin = origin.trim().to_ascii_uppercase();
        let destination = destination.trim().to_ascii_uppercase();
        if origin.is_empty() || destination.is_empty() {
            return Err(SearchError::InvalidQuery(
                "origin and destination are required".to_string(),
            ));
        }

        let day_part = date.trim().split('T').next().unwrap_or_default();
        let date = day_part.parse::<NaiveDate>().map_err(|_| {
            SearchError::InvalidDate(format!("expected YYYY-MM-DD, got {:?}", date))
        })?;

        Ok(Self {
            origin,
            destination,
            date,
        })
    }

    /// Deterministic cache key for this query.
    pub fn cache_key(&self) -> String {
        format!("flight:{}:{}:{}", self.origin, self.destination, self.date)
    }

    /// UTC day window the store query matches departures against:
    /// `[start, start + 1 day)`.
    pub fn day_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.date.and_time(NaiveTime::MIN).and_utc();
        (start, start + Duration::days(1))
    }
}

/// One flight matching a search, with a point-in-time availability
/// snapshot per cabin. The shape is identical whether it was served from
/// cache or computed fresh from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSearchResult {
    pub flight_id: Uuid,
    pub flight_number: String,
    pub airline: AirlineSummary,
    pub origin: AirportSummary,
    pub destination: AirportSummary,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub cabins: Vec<CabinAvailability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineSummary {
    pub iata_code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportSummary {
    pub iata_code: String,
    pub name: String,
    pub city: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinAvailability {
    pub cabin_class: CabinClass,
    pub total_seats: i32,
    pub booked_seats: i32,
    pub seats_available: i32,
}
