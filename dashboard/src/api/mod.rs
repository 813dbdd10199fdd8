pub mod recommendations;
pub mod restaurants;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use common::session::SessionContext;
use common::types::errors::ApiError;
use common::types::position::Position;
use common::types::restaurant::{Dish, RestaurantId, RestaurantWithDistance};

/// Sobre estándar de las respuestas del backend: `{ data, total }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Cuerpo de `POST /restaurantes/buscar`. Todos los campos son
/// opcionales a nivel de wire; la validez la garantiza `SearchCriteria`
/// antes de llegar acá.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termino: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitud: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitud: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radio: Option<f64>,
}

/// Preferencias recolectadas por el wizard, ya con las claves de wire
/// (`clima_actual`, `ocasion`, `distancia`, `antojo`, `presupuesto`).
pub type Preferences = HashMap<String, String>;

/// Backend de restaurantes (REST/JSON).
#[async_trait]
pub trait RestaurantBackend: Send + Sync {
    async fn nearby(
        &self,
        position: Position,
        radius_km: f64,
    ) -> Result<Vec<RestaurantWithDistance>, ApiError>;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RestaurantWithDistance>, ApiError>;

    async fn favorites(
        &self,
        session: &SessionContext,
        position: Option<Position>,
    ) -> Result<Vec<RestaurantWithDistance>, ApiError>;

    async fn add_favorite(
        &self,
        session: &SessionContext,
        id: RestaurantId,
    ) -> Result<(), ApiError>;

    async fn remove_favorite(
        &self,
        session: &SessionContext,
        id: RestaurantId,
    ) -> Result<(), ApiError>;

    async fn dishes(&self, id: RestaurantId) -> Result<Vec<Dish>, ApiError>;
}

/// Servicio de recomendaciones con IA.
#[async_trait]
pub trait RecommendationBackend: Send + Sync {
    async fn discover(
        &self,
        preferences: &Preferences,
        position: Position,
        top_n: u32,
    ) -> Result<Vec<RestaurantWithDistance>, ApiError>;
}
