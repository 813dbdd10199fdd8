use thiserror::Error;

use crate::types::criteria::SearchCriteria;

/// Falla de bajo nivel hablando con cualquiera de los backends.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("error de red: {0}")]
    Http(#[from] reqwest::Error),

    #[error("el servidor respondió {status}: {message}")]
    Status { status: u16, message: String },

    #[error("respuesta malformada: {0}")]
    Json(#[from] serde_json::Error),
}

/// Clasificación de errores de geolocalización. Cada error de la
/// plataforma cae en exactamente una de estas tres clases; el mensaje
/// visible sale de acá, nunca del error crudo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("Permiso de ubicación denegado. Por favor, habilita los permisos de ubicación.")]
    PermissionDenied,

    #[error("Información de ubicación no disponible.")]
    Unavailable,

    #[error("Se agotó el tiempo de espera para obtener la ubicación.")]
    Timeout,
}

/// Las búsquedas mal formadas no existen a nivel de error: los variantes
/// de `SearchCriteria` las hacen irrepresentables.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Falla de red: conserva el criterio intentado para poder reintentar
    /// exactamente la misma búsqueda.
    #[error("No pudimos completar la búsqueda. Revisa tu conexión e intenta de nuevo.")]
    Network { criteria: SearchCriteria },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FavoriteError {
    #[error("Debes iniciar sesión para guardar favoritos.")]
    Unauthenticated,

    #[error("No pudimos actualizar tus favoritos. Intenta de nuevo.")]
    ToggleFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("No se pudo obtener tu ubicación")]
    MissingPosition,

    #[error("Error al procesar tu solicitud. Intenta nuevamente.")]
    Service,

    #[error("No se encontraron recomendaciones. Intenta con otras preferencias.")]
    NoRecommendations,
}
