use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    bookings::{
        dto::{BookingPatch, CreateBookingRequest, CreatedBooking},
        repo_types::Booking,
        services,
    },
    error::AppError,
    extractors::{JsonBody, ResourceId},
    state::AppState,
};

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/booking", post(create_booking))
        .route(
            "/booking/:id",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/bookings", get(list_bookings))
}

#[instrument(skip_all)]
pub async fn create_booking(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = services::create(state.bookings.as_ref(), payload)
        .await
        .inspect_err(|e| e.log("create booking", None))?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/booking/{id}"))],
        Json(CreatedBooking { id }),
    ))
}

#[instrument(skip_all, fields(booking_id = id))]
pub async fn get_booking(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<Booking>, AppError> {
    let booking = services::get(state.bookings.as_ref(), id)
        .await
        .inspect_err(|e| e.log("get booking", Some(id)))?;
    Ok(Json(booking))
}

#[instrument(skip_all)]
pub async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = services::list(state.bookings.as_ref())
        .await
        .inspect_err(|e| e.log("list bookings", None))?;
    Ok(Json(bookings))
}

#[instrument(skip_all, fields(booking_id = id))]
pub async fn update_booking(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    JsonBody(patch): JsonBody<BookingPatch>,
) -> Result<StatusCode, AppError> {
    services::update(state.bookings.as_ref(), id, patch)
        .await
        .inspect_err(|e| e.log("update booking", Some(id)))?;
    Ok(StatusCode::OK)
}

#[instrument(skip_all, fields(booking_id = id))]
pub async fn delete_booking(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, AppError> {
    services::delete(state.bookings.as_ref(), id)
        .await
        .inspect_err(|e| e.log("delete booking", Some(id)))?;
    Ok(StatusCode::OK)
}
