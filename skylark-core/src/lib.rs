pub mod booking;
pub mod cabin;
pub mod error;
pub mod lock;
pub mod reference;
pub mod repository;
pub mod search;

pub use booking::{Booking, BookingStatus, ResourceUnit};
pub use cabin::CabinClass;
pub use error::{BookingError, SearchError};
pub use lock::{lease_key, Lease, LockError, LockPolicy, LockService};
pub use reference::{PnrGenerator, ReferenceSource};
pub use repository::{FlightRepository, InventoryRepository, ReserveOutcome, SearchCache};
pub use search::{FlightSearchResult, SearchQuery};
