use actix::prelude::*;

use crate::types::position::Position;
use crate::types::route::RouteEstimate;

/// Muestra la vista previa de ruta. Siempre destruye y reconstruye el
/// overlay completo: vive poco y hay exactamente una instancia.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct ShowRoute {
    pub start: Position,
    pub end: Position,
    pub label: String,
    pub estimate: Option<RouteEstimate>,
}

/// Completa una estimación que llegó después de abrir el overlay.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct ProvideEstimate {
    pub estimate: RouteEstimate,
}

/// Cierra el overlay y corta la animación.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct HideRoute;

/// Abre la navegación real en la app de mapas externa.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct OpenExternalNavigation;
