use std::sync::Arc;

use skylark_booking::ReservationCoordinator;
use skylark_search::SearchService;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ReservationCoordinator>,
    pub search: Arc<SearchService>,
    pub auth: AuthConfig,
}
