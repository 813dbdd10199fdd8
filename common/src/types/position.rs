use serde::{Deserialize, Serialize};

/// Lectura puntual de GPS. Inmutable: cada actualización reemplaza la anterior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitud: f64,
    pub longitud: f64,
}

impl Position {
    pub fn new(latitud: f64, longitud: f64) -> Self {
        Self { latitud, longitud }
    }
}
