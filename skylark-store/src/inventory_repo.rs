use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::error::Error;
use std::str::FromStr;
use uuid::Uuid;

use skylark_core::booking::{Booking, BookingStatus, ResourceUnit};
use skylark_core::cabin::CabinClass;
use skylark_core::repository::{InventoryRepository, ReserveOutcome};

/// Postgres-backed seat inventory and booking store.
pub struct PostgresInventoryRepository {
    pool: PgPool,
}

impl PostgresInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct InventoryRow {
    id: Uuid,
    flight_id: Uuid,
    cabin_class: String,
    total_seats: i32,
    booked_seats: i32,
    version: i32,
}

impl InventoryRow {
    fn into_unit(self) -> Result<ResourceUnit, Box<dyn Error + Send + Sync>> {
        let cabin_class = CabinClass::from_str(&self.cabin_class)?;
        Ok(ResourceUnit {
            id: self.id,
            flight_id: self.flight_id,
            cabin_class,
            total_seats: self.total_seats,
            booked_seats: self.booked_seats,
            version: self.version,
        })
    }
}

/// Postgres SQLSTATE 23505 (unique_violation); with this schema that is
/// the booking-reference uniqueness constraint firing.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

#[async_trait]
impl InventoryRepository for PostgresInventoryRepository {
    async fn find_unit(
        &self,
        flight_id: Uuid,
        cabin: CabinClass,
    ) -> Result<Option<ResourceUnit>, Box<dyn Error + Send + Sync>> {
        let row: Option<InventoryRow> = sqlx::query_as(
            r#"
            SELECT id, flight_id, cabin_class, total_seats, booked_seats, version
            FROM seat_inventory
            WHERE flight_id = $1 AND cabin_class = $2
            "#,
        )
        .bind(flight_id)
        .bind(cabin.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(InventoryRow::into_unit).transpose()
    }

    async fn reserve_one(
        &self,
        flight_id: Uuid,
        cabin: CabinClass,
        user_id: Uuid,
        reference: &str,
    ) -> Result<ReserveOutcome, Box<dyn Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        // Re-read under the transaction. The row lock also serializes any
        // writer that slipped past the lease.
        let row: Option<InventoryRow> = sqlx::query_as(
            r#"
            SELECT id, flight_id, cabin_class, total_seats, booked_seats, version
            FROM seat_inventory
            WHERE flight_id = $1 AND cabin_class = $2
            FOR UPDATE
            "#,
        )
        .bind(flight_id)
        .bind(cabin.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let unit = match row {
            Some(row) => row.into_unit()?,
            None => {
                tx.rollback().await?;
                return Ok(ReserveOutcome::NotFound);
            }
        };

        if unit.is_sold_out() {
            tx.rollback().await?;
            return Ok(ReserveOutcome::SoldOut);
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            reference: reference.to_string(),
            user_id,
            flight_id,
            cabin_class: cabin,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO bookings (id, pnr, user_id, flight_id, cabin_class, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.reference)
        .bind(booking.user_id)
        .bind(booking.flight_id)
        .bind(booking.cabin_class.as_str())
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            tx.rollback().await?;
            if is_unique_violation(&e) {
                return Ok(ReserveOutcome::DuplicateReference);
            }
            return Err(e.into());
        }

        // The increment stays conditional on remaining capacity, so the
        // count can never pass total_seats even if the lease failed open.
        let updated = sqlx::query(
            r#"
            UPDATE seat_inventory
            SET booked_seats = booked_seats + 1, version = version + 1
            WHERE id = $1 AND booked_seats < total_seats
            "#,
        )
        .bind(unit.id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(ReserveOutcome::SoldOut);
        }

        tx.commit().await?;
        Ok(ReserveOutcome::Recorded(booking))
    }
}
