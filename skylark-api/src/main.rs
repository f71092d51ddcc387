use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use skylark_api::{
    app,
    state::{AppState, AuthConfig},
};
use skylark_booking::ReservationCoordinator;
use skylark_core::lock::LockPolicy;
use skylark_core::reference::PnrGenerator;
use skylark_search::SearchService;
use skylark_store::{
    app_config::Config, DbClient, PostgresFlightRepository, PostgresInventoryRepository,
    RedisClient, RedisLockService, RedisSearchCache,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "skylark_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Skylark API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let redis = RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    let lock_policy = LockPolicy {
        retry_count: config.locking.retry_count,
        retry_delay: Duration::from_millis(config.locking.retry_delay_ms),
    };
    let locks = Arc::new(RedisLockService::new(redis.clone(), lock_policy));
    let inventory = Arc::new(PostgresInventoryRepository::new(db.pool.clone()));
    let references = Arc::new(PnrGenerator::default());
    let coordinator = Arc::new(ReservationCoordinator::new(
        locks,
        inventory,
        references,
        Duration::from_millis(config.locking.lease_duration_ms),
        config.reservation.reference_attempts,
    ));

    let flights = Arc::new(PostgresFlightRepository::new(db.pool.clone()));
    let cache = Arc::new(RedisSearchCache::new(redis.clone()));
    let search = Arc::new(SearchService::new(
        flights,
        cache,
        Duration::from_secs(config.cache.search_ttl_seconds),
    ));

    let app_state = AppState {
        coordinator,
        search,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
