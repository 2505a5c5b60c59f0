use async_trait::async_trait;

use crate::{
    bookings::{
        dto::BookingPatch,
        repo_types::{Booking, NewBooking},
    },
    db::{execute_patch, map_db_error, PgStore},
    error::AppError,
    patch::{build_patch, Column, ColumnMap},
};

pub const BOOKING_COLUMNS: ColumnMap = ColumnMap {
    table: "bookings",
    id_column: "id",
    columns: &[
        Column::immutable("id", "id"),
        Column::mutable("user_id", "user_id"),
        Column::mutable("start_time", "start_time"),
        Column::mutable("end_time", "end_time"),
        Column::mutable("note", "note"),
    ],
    updated_at: None,
};

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, booking: &NewBooking) -> Result<i64, AppError>;
    async fn find(&self, id: i64) -> Result<Option<Booking>, AppError>;
    async fn list(&self) -> Result<Vec<Booking>, AppError>;
    async fn update(&self, id: i64, patch: &BookingPatch) -> Result<u64, AppError>;
    async fn delete(&self, id: i64) -> Result<u64, AppError>;
}

#[async_trait]
impl BookingStore for PgStore {
    async fn insert(&self, booking: &NewBooking) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO bookings (user_id, start_time, end_time, note)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(&booking.note)
        .fetch_one(&self.db)
        .await
        .map_err(map_db_error)
    }

    async fn find(&self, id: i64) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, user_id, start_time, end_time, note
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(booking)
    }

    async fn list(&self) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, user_id, start_time, end_time, note
            FROM bookings
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(bookings)
    }

    async fn update(&self, id: i64, patch: &BookingPatch) -> Result<u64, AppError> {
        let stmt = build_patch(patch, &BOOKING_COLUMNS, id)?;
        execute_patch(&self.db, &stmt).await
    }

    async fn delete(&self, id: i64) -> Result<u64, AppError> {
        let done = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected())
    }
}
