use actix::prelude::*;

use crate::types::restaurant::{RestaurantId, ResultSet};

/// Abre el wizard de descubrimiento en la primera pregunta, con estado limpio.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct OpenWizard;

/// Registra la opción elegida para la pregunta actual. Una segunda
/// selección antes de que venza el retardo de avance reemplaza a la
/// primera (gana la última).
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct SelectOption {
    pub value: String,
}

/// Vuelve a la pregunta anterior sin borrar su respuesta.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct StepBack;

/// "Buscar de nuevo": reset completo a la primera pregunta. También es
/// el único camino de recuperación desde un error.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct RestartWizard;

/// Cierra el wizard descartando el estado recolectado.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct CloseWizard;

/// "Ver en el mapa" desde los resultados del wizard.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct ViewOnMap {
    pub id: RestaurantId,
}

/// Recomendaciones rankeadas listas, con el orden del servicio intacto.
/// Mismo tipo de conjunto que produce la búsqueda: el dashboard lo
/// consume sin distinguir la fuente.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct RecommendationsReady {
    pub results: ResultSet,
}

/// Evento cruzado wizard → dashboard para seleccionar un restaurante en
/// el mapa. Mantiene al wizard desacoplado del sincronizador.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct ShowRestaurantOnMap {
    pub id: RestaurantId,
}
