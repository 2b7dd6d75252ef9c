use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use super::error::ApiError;
use crate::app_state::HotelState;
use crate::models::hotel::{
    ContactInfo, CreateHotelRequest, Hotel, HotelOfficial, LocationStats, NewContactInfo,
    StatsQuery,
};

fn parse_body<T: Validate<Context = ()>>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(value) = body.map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;
    value
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;
    Ok(value)
}

fn hotel_id<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(ids)| ids)
        .map_err(|_| ApiError::BadRequest("Invalid hotel ID".to_string()))
}

/// GET /hotels/stats?location= — hotel and phone counts for a location.
pub async fn hotel_stats(
    State(state): State<HotelState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<LocationStats>, ApiError> {
    if query.location.is_empty() {
        return Err(ApiError::BadRequest(
            "location parameter is required".to_string(),
        ));
    }

    Ok(Json(state.hotels.location_stats(&query.location).await?))
}

/// POST /hotels
pub async fn create_hotel(
    State(state): State<HotelState>,
    body: Result<Json<CreateHotelRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Hotel>), ApiError> {
    let request = parse_body(body)?;
    let hotel = state.hotels.create_hotel(request).await?;
    tracing::info!(hotel_id = %hotel.id, "Hotel created");
    Ok((StatusCode::CREATED, Json(hotel)))
}

/// GET /hotels
pub async fn list_hotels(State(state): State<HotelState>) -> Result<Json<Vec<Hotel>>, ApiError> {
    Ok(Json(state.hotels.list_hotels().await?))
}

/// GET /hotels/officials
pub async fn list_officials(
    State(state): State<HotelState>,
) -> Result<Json<Vec<HotelOfficial>>, ApiError> {
    Ok(Json(state.hotels.list_officials().await?))
}

/// GET /hotels/{id}
pub async fn get_hotel(
    State(state): State<HotelState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Hotel>, ApiError> {
    let id = hotel_id(path)?;
    state
        .hotels
        .get_hotel(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Hotel not found".to_string()))
}

/// DELETE /hotels/{id}
pub async fn delete_hotel(
    State(state): State<HotelState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = hotel_id(path)?;
    state.hotels.delete_hotel(id).await?;
    tracing::info!(hotel_id = %id, "Hotel deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /hotels/{id}/contacts
pub async fn add_contact(
    State(state): State<HotelState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<NewContactInfo>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactInfo>), ApiError> {
    let id = hotel_id(path)?;
    let contact = parse_body(body)?;
    let contact = state.hotels.add_contact(id, contact).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// DELETE /hotels/{id}/contacts/{contact_id}
pub async fn remove_contact(
    State(state): State<HotelState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let (id, contact_id) = hotel_id(path)?;
    state.hotels.remove_contact(id, contact_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
