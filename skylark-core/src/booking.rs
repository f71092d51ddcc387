use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cabin::CabinClass;

/// Point-in-time snapshot of the seat counters for one (flight, cabin)
/// pair. `total_seats` is immutable after creation; `booked_seats` only
/// grows while bookings are created and never cancelled. The invariant
/// `0 <= booked_seats <= total_seats` holds at every transaction boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUnit {
    pub id: Uuid,
    pub flight_id: Uuid,
    pub cabin_class: CabinClass,
    pub total_seats: i32,
    pub booked_seats: i32,
    /// Bumped by every reserve transaction; the conditional-update
    /// backstop in the store keys off it.
    pub version: i32,
}

impl ResourceUnit {
    pub fn seats_remaining(&self) -> i32 {
        (self.total_seats - self.booked_seats).max(0)
    }

    pub fn is_sold_out(&self) -> bool {
        self.booked_seats >= self.total_seats
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// The only status the reservation path produces.
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A confirmed reservation. Created exactly once inside the atomic
/// reserve transaction and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// Human-presentable PNR-style code, unique across all bookings.
    pub reference: String,
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub cabin_class: CabinClass,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}
