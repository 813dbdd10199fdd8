use std::collections::HashMap;

use actix::prelude::*;

use common::types::position::Position;
use common::types::restaurant::RestaurantId;
use common::types::route::RouteSegment;

/// Acción del botón "reintentar" ante un permiso de ubicación denegado:
/// el dashboard pide una lectura explícita al tracker.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct RetryLocation;

/// Pide la vista previa de ruta para la selección actual. Requiere
/// selección y posición conocidas; si falta alguna, no hace nada.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct PreviewRoute;

/// Estado observable del tracker, para tests y diagnóstico.
#[derive(Message, Debug, Clone)]
#[rtype(result = "TrackerStatus")]
pub struct GetTrackerStatus;

#[derive(Debug, Clone)]
pub struct TrackerStatus {
    pub seq: u64,
    pub watching: bool,
}

/// Estado observable del dashboard.
#[derive(Message, Debug, Clone)]
#[rtype(result = "DashboardStatus")]
pub struct GetDashboardStatus;

#[derive(Debug, Clone)]
pub struct DashboardStatus {
    pub position: Option<Position>,
    pub result_ids: Vec<RestaurantId>,
    pub selected: Option<RestaurantId>,
    pub retry_available: bool,
    pub has_failed_search: bool,
}

/// Estado observable del wizard.
#[derive(Message, Debug, Clone)]
#[rtype(result = "WizardStatus")]
pub struct GetWizardStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPhaseView {
    Closed,
    Asking(usize),
    Submitting,
    Results,
    Failed,
}

#[derive(Debug, Clone)]
pub struct WizardStatus {
    pub phase: WizardPhaseView,
    pub answers: HashMap<String, String>,
    pub submissions: u32,
    pub result_ids: Vec<RestaurantId>,
}

/// Estado observable del overlay de ruta.
#[derive(Message, Debug, Clone)]
#[rtype(result = "OverlayStatus")]
pub struct GetOverlayStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstimateView {
    Calculating,
    Known,
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct OverlayStatus {
    pub active: bool,
    pub estimate: Option<EstimateView>,
    /// Desglose del panel; vacío mientras no hay estimación conocida.
    pub segments: Vec<RouteSegment>,
    pub dash_offset: u32,
    pub last_nav_url: Option<String>,
}
