use time::OffsetDateTime;
use tracing::{debug, info};

use crate::{
    bookings::{
        dto::{BookingPatch, CreateBookingRequest},
        repo::{BookingStore, BOOKING_COLUMNS},
        repo_types::{Booking, NewBooking},
    },
    error::AppError,
    fields::Fields,
    patch::ensure_not_empty,
    validation::{require, validate, validate_partial, FieldRule, Rule, RuleKind, ValidationErrors},
};

const NOTE_DENY: &str = "<>{}\\`";

pub const BOOKING_RULES: &[FieldRule] = &[
    FieldRule::new("user_id", Rule::new().required().min_val(1)),
    FieldRule::new("start_time", Rule::new().required()),
    FieldRule::new("end_time", Rule::new().required()),
    FieldRule::new("note", Rule::new().max_len(255).deny(NOTE_DENY)),
];

pub(crate) fn time_order_violation() -> ValidationErrors {
    ValidationErrors::single(
        "end_time",
        RuleKind::Order,
        "end_time must be after start_time",
    )
}

pub(crate) fn unknown_owner() -> ValidationErrors {
    ValidationErrors::single("user_id", RuleKind::Reference, "user_id does not refer to an existing user")
}

pub(crate) fn check_time_order(
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<(), ValidationErrors> {
    if start < end {
        Ok(())
    } else {
        Err(time_order_violation())
    }
}

/// Runs the rule table and, when both times are known, the ordering check,
/// reporting every failure together.
fn validate_booking<R: Fields>(
    record: &R,
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
    partial: bool,
) -> Result<(), ValidationErrors> {
    let checked = if partial {
        validate_partial(record, BOOKING_RULES)
    } else {
        validate(record, BOOKING_RULES)
    };
    let mut violations = checked.err().map(|e| e.0).unwrap_or_default();
    if let (Some(start), Some(end)) = (start, end) {
        if let Err(order) = check_time_order(start, end) {
            violations.extend(order.0);
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(violations))
    }
}

pub async fn create(store: &dyn BookingStore, req: CreateBookingRequest) -> Result<i64, AppError> {
    validate_booking(&req, req.start_time, req.end_time, false)?;
    let user_id = require(req.user_id, "user_id")?;
    let start_time = require(req.start_time, "start_time")?;
    let end_time = require(req.end_time, "end_time")?;

    let id = store
        .insert(&NewBooking {
            user_id,
            start_time,
            end_time,
            note: req.note.unwrap_or_default(),
        })
        .await?;
    info!(booking_id = id, user_id, "booking created");
    Ok(id)
}

pub async fn get(store: &dyn BookingStore, id: i64) -> Result<Booking, AppError> {
    store
        .find(id)
        .await?
        .ok_or(AppError::NotFound { entity: "booking", id })
}

pub async fn list(store: &dyn BookingStore) -> Result<Vec<Booking>, AppError> {
    let bookings = store.list().await?;
    debug!(count = bookings.len(), "bookings listed");
    Ok(bookings)
}

/// When only one of the two times is supplied, ordering against the stored
/// value is left to the store.
pub async fn update(store: &dyn BookingStore, id: i64, patch: BookingPatch) -> Result<(), AppError> {
    validate_booking(&patch, patch.start_time, patch.end_time, true)?;
    ensure_not_empty(&patch, &BOOKING_COLUMNS)?;

    let rows = store.update(id, &patch).await?;
    if rows == 0 {
        return Err(AppError::NotFound { entity: "booking", id });
    }
    info!(booking_id = id, "booking updated");
    Ok(())
}

pub async fn delete(store: &dyn BookingStore, id: i64) -> Result<(), AppError> {
    let rows = store.delete(id).await?;
    debug!(booking_id = id, rows, "booking deleted");
    Ok(())
}
