use axum::{extract::State, routing::post, Json, Router};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skylark_core::cabin::CabinClass;

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub flight_id: Uuid,
    pub cabin_class: CabinClass,
}

#[derive(Debug, Serialize)]
struct BookingResponse {
    reference: String,
    status: String,
    flight_id: Uuid,
    cabin_class: CabinClass,
    user_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/bookings", post(create_booking))
}

/// POST /v1/bookings
///
/// Reserve one seat in the requested cabin for the authenticated user.
async fn create_booking(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(e.to_string()))?;

    let claims = token_data.claims;
    if claims.role != "CUSTOMER" {
        return Err(AppError::AuthorizationError(
            "Booking requires a customer session".to_string(),
        ));
    }
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::AuthenticationError("Invalid subject claim".to_string()))?;

    let booking = state
        .coordinator
        .create_booking(user_id, req.flight_id, req.cabin_class)
        .await?;

    Ok(Json(BookingResponse {
        reference: booking.reference,
        status: booking.status.to_string(),
        flight_id: booking.flight_id,
        cabin_class: booking.cabin_class,
        user_id: booking.user_id,
    }))
}
