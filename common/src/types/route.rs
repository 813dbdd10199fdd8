use serde::{Deserialize, Serialize};

use crate::utils::format_distance;

/// Estimación de la ruta en línea recta. La navegación real se delega a
/// una app externa; esto alimenta solo el panel de vista previa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub distance_km: f64,
    pub duration: String,
}

/// Paso del desglose cosmético que muestra el panel de ruta.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub instruction: String,
    pub distance: String,
}

impl RouteEstimate {
    /// Desglose fijo en tres tramos (60/30/10) de la distancia en línea
    /// recta. Es estructura de display, no datos de ruta: el cálculo de
    /// segmentos reales queda fuera de alcance.
    pub fn segments(&self, destination: &str) -> Vec<RouteSegment> {
        let arrival = format!("Llega a {}", destination);
        let parts = [
            ("Dirígete hacia la vía principal", 0.6),
            ("Continúa en dirección al destino", 0.3),
            (arrival.as_str(), 0.1),
        ];
        parts
            .iter()
            .map(|(instruction, fraction)| RouteSegment {
                instruction: instruction.to_string(),
                distance: format_distance(self.distance_km * fraction),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_split_the_full_distance_in_three() {
        let estimate = RouteEstimate {
            distance_km: 10.0,
            duration: "24 min".to_string(),
        };
        let segments = estimate.segments("Tacos El Güero");
        let distances: Vec<&str> = segments.iter().map(|s| s.distance.as_str()).collect();
        // 60/30/10: los tramos cubren exactamente la distancia en línea recta.
        assert_eq!(distances, ["6.0 km", "3.0 km", "1.0 km"]);
        assert_eq!(segments[2].instruction, "Llega a Tacos El Güero");
    }

    #[test]
    fn short_segments_fall_back_to_meters() {
        let estimate = RouteEstimate {
            distance_km: 1.0,
            duration: "3 min".to_string(),
        };
        let segments = estimate.segments("destino");
        assert_eq!(segments[1].distance, "300 m");
        assert_eq!(segments[2].distance, "100 m");
    }
}
