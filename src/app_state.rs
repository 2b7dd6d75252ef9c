use axum::extract::FromRef;
use std::sync::Arc;

use crate::db::HotelRepository;
use crate::routes::health::HealthProbe;
use crate::services::report::ReportService;

/// Dependencies probed by `GET /health`.
#[derive(Clone, Default)]
pub struct HealthProbes(pub Arc<Vec<Arc<dyn HealthProbe>>>);

impl HealthProbes {
    pub fn new(probes: Vec<Arc<dyn HealthProbe>>) -> Self {
        Self(Arc::new(probes))
    }
}

/// Shared state of the report service routes.
#[derive(Clone)]
pub struct ReportState {
    pub reports: Arc<ReportService>,
    pub health: HealthProbes,
}

impl ReportState {
    pub fn new(reports: ReportService, health: HealthProbes) -> Self {
        Self {
            reports: Arc::new(reports),
            health,
        }
    }
}

impl FromRef<ReportState> for HealthProbes {
    fn from_ref(state: &ReportState) -> Self {
        state.health.clone()
    }
}

/// Shared state of the hotel directory routes.
#[derive(Clone)]
pub struct HotelState {
    pub hotels: Arc<dyn HotelRepository>,
    pub health: HealthProbes,
}

impl HotelState {
    pub fn new(hotels: Arc<dyn HotelRepository>, health: HealthProbes) -> Self {
        Self { hotels, health }
    }
}

impl FromRef<HotelState> for HealthProbes {
    fn from_ref(state: &HotelState) -> Self {
        state.health.clone()
    }
}
