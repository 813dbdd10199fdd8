use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use common::constants::GEOLOCATION_TIMEOUT_SECS;
use common::types::errors::GeoError;
use common::types::position::Position;

/// Opciones de lectura, equivalentes a las del API de geolocalización
/// del dispositivo: máxima precisión, timeout explícito y nada de
/// lecturas cacheadas.
#[derive(Debug, Clone, Copy)]
pub struct GeoOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl Default for GeoOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(GEOLOCATION_TIMEOUT_SECS),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Capacidad de geolocalización del dispositivo. El tracker depende de
/// este contrato, no de una plataforma concreta, así el mismo actor
/// sirve para el dashboard, el wizard y los tests.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self, options: &GeoOptions) -> Result<Position, GeoError>;
}

/// Geolocalizador simulado para la demo: una posición base con un poco
/// de deriva aleatoria en cada lectura.
pub struct SimulatedGeolocator {
    pub base: Position,
    pub jitter: f64,
}

impl SimulatedGeolocator {
    pub fn new(base: Position, jitter: f64) -> Self {
        Self { base, jitter }
    }
}

#[async_trait]
impl Geolocator for SimulatedGeolocator {
    async fn locate(&self, _options: &GeoOptions) -> Result<Position, GeoError> {
        let mut rng = rand::thread_rng();
        let d_lat = rng.gen_range(-self.jitter..=self.jitter);
        let d_lng = rng.gen_range(-self.jitter..=self.jitter);
        Ok(Position::new(
            self.base.latitud + d_lat,
            self.base.longitud + d_lng,
        ))
    }
}

/// Dispositivo con el permiso de ubicación denegado.
pub struct DeniedGeolocator;

#[async_trait]
impl Geolocator for DeniedGeolocator {
    async fn locate(&self, _options: &GeoOptions) -> Result<Position, GeoError> {
        Err(GeoError::PermissionDenied)
    }
}
