use axum::routing::{delete, get, post};
use axum::Router;

use crate::app_state::{HotelState, ReportState};

pub mod error;
pub mod health;
pub mod hotels;
pub mod metrics;
pub mod reports;

/// Routes of the report service.
pub fn report_routes(state: ReportState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/reports",
            get(reports::list_reports).post(reports::request_report),
        )
        .route("/reports/{id}", get(reports::get_report))
        .with_state(state)
}

/// Routes of the hotel directory service.
pub fn hotel_routes(state: HotelState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/hotels/stats", get(hotels::hotel_stats))
        .route("/hotels/officials", get(hotels::list_officials))
        .route("/hotels", get(hotels::list_hotels).post(hotels::create_hotel))
        .route(
            "/hotels/{id}",
            get(hotels::get_hotel).delete(hotels::delete_hotel),
        )
        .route("/hotels/{id}/contacts", post(hotels::add_contact))
        .route(
            "/hotels/{id}/contacts/{contact_id}",
            delete(hotels::remove_contact),
        )
        .with_state(state)
}
