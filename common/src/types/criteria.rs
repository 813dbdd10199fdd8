use serde::{Deserialize, Serialize};

use crate::types::position::Position;

/// Criterio de búsqueda. La variante elegida hace imposible construir una
/// consulta inválida: "cercanos" siempre lleva posición, y texto/categoría
/// llevan la posición solo como anotación salvo que se fije un radio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchCriteria {
    /// Consulta por pura proximidad (modo por defecto del dashboard).
    Nearby { position: Position, radius_km: f64 },
    /// Búsqueda por término libre.
    Text {
        term: String,
        position: Option<Position>,
        radius_km: Option<f64>,
    },
    /// Búsqueda por nombre de categoría, sin filtro de proximidad
    /// salvo radio explícito.
    Category {
        name: String,
        position: Option<Position>,
        radius_km: Option<f64>,
    },
}

impl SearchCriteria {
    pub fn position(&self) -> Option<Position> {
        match self {
            SearchCriteria::Nearby { position, .. } => Some(*position),
            SearchCriteria::Text { position, .. } => *position,
            SearchCriteria::Category { position, .. } => *position,
        }
    }

    /// Descripción corta para logs.
    pub fn describe(&self) -> String {
        match self {
            SearchCriteria::Nearby { radius_km, .. } => {
                format!("nearby (radius {} km)", radius_km)
            }
            SearchCriteria::Text { term, .. } => format!("text '{}'", term),
            SearchCriteria::Category { name, .. } => format!("category '{}'", name),
        }
    }
}
