pub mod coordinator;

pub use coordinator::ReservationCoordinator;
