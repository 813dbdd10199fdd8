use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::position::Position;
use crate::utils::{estimate_travel_time, haversine_km};

pub type RestaurantId = u64;

/// Snapshot inmutable de un restaurante tal como lo devuelve el backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantSummary {
    #[serde(rename = "idRestaurante")]
    pub id: RestaurantId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "categorias", default)]
    pub categories: Vec<String>,
    #[serde(rename = "calificacionPromedio", default)]
    pub rating: f64,
    #[serde(rename = "precioPromedio", default)]
    pub average_price: Option<f64>,
    #[serde(rename = "latitud")]
    pub latitud: f64,
    #[serde(rename = "longitud")]
    pub longitud: f64,
    #[serde(rename = "estaAbierto", default)]
    pub is_open: bool,
    #[serde(rename = "horarioHoy", default)]
    pub hours_today: Option<String>,
    #[serde(rename = "imagen", default)]
    pub image: Option<String>,
}

impl RestaurantSummary {
    pub fn position(&self) -> Position {
        Position::new(self.latitud, self.longitud)
    }
}

/// Unidad canónica que circula por el dashboard: restaurante + anotaciones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantWithDistance {
    #[serde(flatten)]
    pub summary: RestaurantSummary,
    #[serde(rename = "distanciaKm", default)]
    pub distance_km: Option<f64>,
    #[serde(rename = "tiempoEstimado", default)]
    pub travel_time: Option<String>,
    #[serde(rename = "esFavorito", default)]
    pub is_favorite: bool,
}

impl RestaurantWithDistance {
    pub fn id(&self) -> RestaurantId {
        self.summary.id
    }

    /// Campos que afectan cómo se dibuja el marcador y su popup.
    pub fn display_fields(&self) -> (String, Option<String>, bool, bool) {
        (
            self.summary.name.clone(),
            self.summary.categories.first().cloned(),
            self.summary.is_open,
            self.is_favorite,
        )
    }
}

/// Platillo del menú de un restaurante.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    #[serde(rename = "idPlatillo")]
    pub id: u64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precio")]
    pub price: f64,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "disponible", default)]
    pub available: bool,
    #[serde(rename = "destacado", default)]
    pub featured: bool,
}

/// Quién produjo el conjunto de resultados; el orden significa algo
/// distinto en cada caso (distancia vs. ranking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultOrigin {
    Search,
    Recommendation,
}

/// Secuencia ordenada de restaurantes con ids únicos. El orden de llegada
/// se preserva de punta a punta: es la posición en el ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSet {
    pub origin: ResultOrigin,
    entries: Vec<RestaurantWithDistance>,
}

impl ResultSet {
    /// Construye el conjunto descartando ids duplicados (gana el primero).
    pub fn new(origin: ResultOrigin, entries: Vec<RestaurantWithDistance>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|r| seen.insert(r.id()))
            .collect();
        Self { origin, entries }
    }

    pub fn empty(origin: ResultOrigin) -> Self {
        Self {
            origin,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<RestaurantId> {
        self.entries.iter().map(|r| r.id()).collect()
    }

    pub fn contains(&self, id: RestaurantId) -> bool {
        self.entries.iter().any(|r| r.id() == id)
    }

    pub fn get(&self, id: RestaurantId) -> Option<&RestaurantWithDistance> {
        self.entries.iter().find(|r| r.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RestaurantWithDistance> {
        self.entries.iter()
    }

    /// Posición en el ranking (1-based) de un id, si está presente.
    pub fn rank_of(&self, id: RestaurantId) -> Option<usize> {
        self.entries.iter().position(|r| r.id() == id).map(|i| i + 1)
    }

    /// Marca `is_favorite` cruzando contra la membresía actual de favoritos.
    pub fn annotate_favorites(&mut self, favorites: &HashSet<RestaurantId>) {
        for entry in &mut self.entries {
            entry.is_favorite = favorites.contains(&entry.id());
        }
    }

    /// Recalcula distancia y tiempo estimado de todas las entradas para
    /// una posición fresca. No se asume que una anotación previa siga
    /// vigente frente a una actualización de posición.
    pub fn annotate_distances(&mut self, position: Position) {
        for entry in &mut self.entries {
            let km = haversine_km(position, entry.summary.position());
            entry.distance_km = Some(km);
            entry.travel_time = Some(estimate_travel_time(km));
        }
    }

    /// Deriva distancia/tiempo solo donde el backend los dejó sin anotar;
    /// los valores calculados del lado del servidor se respetan.
    pub fn fill_missing_distances(&mut self, position: Position) {
        for entry in &mut self.entries {
            if entry.distance_km.is_none() {
                let km = haversine_km(position, entry.summary.position());
                entry.distance_km = Some(km);
            }
            if entry.travel_time.is_none() {
                if let Some(km) = entry.distance_km {
                    entry.travel_time = Some(estimate_travel_time(km));
                }
            }
        }
    }
}
