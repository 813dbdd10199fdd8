use actix::prelude::*;

use crate::types::errors::GeoError;
use crate::types::position::Position;

/// Arranca el seguimiento de posición. En modo continuo el tracker
/// emite lecturas periódicas hasta recibir `StopTracking`.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct StartTracking {
    pub continuous: bool,
}

/// Pide una única lectura fresca. Es también la vía de reintento
/// explícito después de un permiso denegado.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct RefreshOnce;

/// Detiene el seguimiento continuo y cancela el timer interno.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct StopTracking;

/// Registra un suscriptor a las actualizaciones de posición.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SubscribePosition {
    pub recipient: Recipient<PositionUpdate>,
}

/// Lectura de posición numerada. Los suscriptores descartan toda
/// actualización cuyo `seq` no sea el mayor visto (last-issued-wins).
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct PositionUpdate {
    pub seq: u64,
    pub reading: Result<Position, GeoError>,
}
