use crate::cabin::CabinClass;

/// Reservation-path outcomes that are not a confirmed booking.
///
/// These are expected, typed results — never raised faults — and none of
/// them leaves partial state behind: a failed reservation creates no
/// booking row and moves no counter.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// The lease could not be acquired within the bounded retries. Not an
    /// inventory fact; the caller may retry later.
    #[error("system busy, please try again")]
    LockBusy,

    /// No inventory exists for the (flight, cabin class) pair.
    #[error("invalid flight or cabin class")]
    ResourceNotFound,

    /// Capacity exhausted at check time. Retrying the same request cannot
    /// succeed until capacity changes.
    #[error("sold out: no {0} seats remaining")]
    SoldOut(CabinClass),

    /// Freshly generated reference codes kept colliding with existing
    /// bookings; transient, safe for the caller to retry.
    #[error("could not allocate a unique booking reference after {attempts} attempts")]
    ReferenceCollision { attempts: u32 },

    /// Persistence layer unreachable mid-reservation.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid search query: {0}")]
    InvalidQuery(String),

    #[error("invalid search date: {0}")]
    InvalidDate(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}
