pub mod app_config;
pub mod cache;
pub mod database;
pub mod flight_repo;
pub mod inventory_repo;
pub mod lock;
pub mod redis_repo;

pub use app_config::Config;
pub use cache::RedisSearchCache;
pub use database::DbClient;
pub use flight_repo::PostgresFlightRepository;
pub use inventory_repo::PostgresInventoryRepository;
pub use lock::RedisLockService;
pub use redis_repo::RedisClient;
