use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::error::Error;
use std::str::FromStr;
use uuid::Uuid;

use skylark_core::cabin::CabinClass;
use skylark_core::repository::FlightRepository;
use skylark_core::search::{
    AirlineSummary, AirportSummary, CabinAvailability, FlightSearchResult, SearchQuery,
};

/// Postgres-backed flight catalog queries.
pub struct PostgresFlightRepository {
    pool: PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    flight_number: String,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    airline_code: String,
    airline_name: String,
    origin_code: String,
    origin_name: String,
    origin_city: String,
    destination_code: String,
    destination_name: String,
    destination_city: String,
}

#[derive(sqlx::FromRow)]
struct CabinRow {
    cabin_class: String,
    total_seats: i32,
    booked_seats: i32,
}

#[async_trait]
impl FlightRepository for PostgresFlightRepository {
    async fn search_flights(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<FlightSearchResult>, Box<dyn Error + Send + Sync>> {
        let (day_start, day_end) = query.day_bounds();

        let flights: Vec<FlightRow> = sqlx::query_as(
            r#"
            SELECT
                f.id, f.flight_number, f.departure_time, f.arrival_time,
                al.iata_code AS airline_code, al.name AS airline_name,
                o.iata_code AS origin_code, o.name AS origin_name, o.city AS origin_city,
                d.iata_code AS destination_code, d.name AS destination_name, d.city AS destination_city
            FROM flights f
            JOIN airlines al ON al.id = f.airline_id
            JOIN airports o ON o.id = f.origin_airport_id
            JOIN airports d ON d.id = f.destination_airport_id
            WHERE o.iata_code = $1
              AND d.iata_code = $2
              AND f.departure_time >= $3
              AND f.departure_time < $4
            ORDER BY f.departure_time
            "#,
        )
        .bind(&query.origin)
        .bind(&query.destination)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await?;

        let mut results = Vec::with_capacity(flights.len());
        for row in flights {
            let cabin_rows: Vec<CabinRow> = sqlx::query_as(
                r#"
                SELECT cabin_class, total_seats, booked_seats
                FROM seat_inventory
                WHERE flight_id = $1
                ORDER BY cabin_class
                "#,
            )
            .bind(row.id)
            .fetch_all(&self.pool)
            .await?;

            let mut cabins = Vec::with_capacity(cabin_rows.len());
            for cabin in cabin_rows {
                let cabin_class = CabinClass::from_str(&cabin.cabin_class)?;
                cabins.push(CabinAvailability {
                    cabin_class,
                    total_seats: cabin.total_seats,
                    booked_seats: cabin.booked_seats,
                    seats_available: (cabin.total_seats - cabin.booked_seats).max(0),
                });
            }

            results.push(FlightSearchResult {
                flight_id: row.id,
                flight_number: row.flight_number,
                airline: AirlineSummary {
                    iata_code: row.airline_code,
                    name: row.airline_name,
                },
                origin: AirportSummary {
                    iata_code: row.origin_code,
                    name: row.origin_name,
                    city: row.origin_city,
                },
                destination: AirportSummary {
                    iata_code: row.destination_code,
                    name: row.destination_name,
                    city: row.destination_city,
                },
                departure_time: row.departure_time,
                arrival_time: row.arrival_time,
                cabins,
            });
        }

        Ok(results)
    }
}
