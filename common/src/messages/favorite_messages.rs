use std::collections::HashSet;

use actix::prelude::*;

use crate::types::errors::FavoriteError;
use crate::types::position::Position;
use crate::types::restaurant::RestaurantId;

/// Carga la membresía de favoritos desde el backend. La posición es
/// opcional y solo sirve para que el backend anote distancias. Devuelve
/// cuántos favoritos hay; sin sesión, `Unauthenticated` (distinguible de
/// una falla de red para que la UI ofrezca iniciar sesión, no reintentar).
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<usize, FavoriteError>")]
pub struct LoadFavorites {
    pub position: Option<Position>,
}

/// Alterna un favorito de forma optimista: el estado local cambia ya,
/// el backend confirma después y una falla revierte el cambio.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct ToggleFavorite {
    pub id: RestaurantId,
}

/// Membresía actual, para anotar conjuntos de resultados.
#[derive(Message, Debug, Clone)]
#[rtype(result = "HashSet<RestaurantId>")]
pub struct FavoriteSnapshot;

/// Notificación de cambio de favoritos hacia el dashboard. Si
/// `rolled_back` es true el flip optimista se revirtió y `error`
/// explica por qué.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct FavoritesChanged {
    pub id: RestaurantId,
    pub now_favorite: bool,
    pub rolled_back: bool,
    pub error: Option<FavoriteError>,
}
