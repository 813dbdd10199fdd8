use actix::prelude::*;

use crate::types::position::Position;
use crate::types::restaurant::{RestaurantId, ResultSet};

/// Pide sincronizar la superficie del mapa con un conjunto de resultados
/// y la posición actual. Si la superficie todavía no está lista, el
/// pedido se encola (coalescido) en lugar de fallar.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct RenderResults {
    pub results: ResultSet,
    pub position: Option<Position>,
}

/// La superficie terminó su inicialización asíncrona; aplicar cualquier
/// render pendiente.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct SetSurfaceReady;

/// Click en un marcador. Lleva solo el id: la selección vive en el
/// dashboard, nunca en el sincronizador.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct MarkerClicked {
    pub id: RestaurantId,
}
