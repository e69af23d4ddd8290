pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod controllers;
pub mod middleware;

use std::sync::Arc;

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub shows: services::ShowService,
    pub seats: services::SeatService,
    pub reservations: services::ReservationService,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;

        db.run_migrations().await?;

        let shows = services::ShowService::new(db.pool.clone());
        let seats = services::SeatService::new(db.pool.clone());
        let reservations = services::ReservationService::new(db.pool.clone());

        Ok(Arc::new(Self {
            db,
            config,
            shows,
            seats,
            reservations,
        }))
    }
}
