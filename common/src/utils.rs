use crate::constants::AVERAGE_SPEED_KMH;
use crate::types::position::Position;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distancia Haversine entre dos posiciones, en kilómetros.
pub fn haversine_km(from: Position, to: Position) -> f64 {
    let d_lat = (to.latitud - from.latitud).to_radians();
    let d_lon = (to.longitud - from.longitud).to_radians();
    let lat1 = from.latitud.to_radians();
    let lat2 = to.latitud.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Tiempo estimado de llegada en condiciones normales de tráfico.
pub fn estimate_travel_time(distance_km: f64) -> String {
    let minutes = (distance_km / AVERAGE_SPEED_KMH * 60.0).ceil().max(1.0) as u64;
    if minutes < 60 {
        format!("{} min", minutes)
    } else {
        format!("{} h {} min", minutes / 60, minutes % 60)
    }
}

/// Convierte km a metros si es menor a 1 km.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as i64)
    } else {
        format!("{:.1} km", km)
    }
}

/// Rango de precio a partir del precio promedio por persona.
pub fn price_tier(precio_promedio: Option<f64>) -> &'static str {
    match precio_promedio {
        None => "$",
        Some(p) if p <= 0.0 => "$",
        Some(p) if p < 100.0 => "$",
        Some(p) if p < 300.0 => "$$",
        Some(p) if p < 500.0 => "$$$",
        Some(_) => "$$$$",
    }
}
