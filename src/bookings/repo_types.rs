use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Booking record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64, // owning user, cascades on delete
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i64,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub note: String,
}
