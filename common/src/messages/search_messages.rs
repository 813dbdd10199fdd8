use actix::prelude::*;

use crate::types::criteria::SearchCriteria;
use crate::types::errors::SearchError;
use crate::types::restaurant::ResultSet;

/// Pedido de búsqueda. El coordinador lo somete a debounce: un pedido
/// nuevo reemplaza al que todavía no se despachó.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct SearchRequest {
    pub criteria: SearchCriteria,
}

/// Resultado de una búsqueda ya resuelta. `seq` permite al receptor
/// aplicar la disciplina de descarte: solo la última emitida cuenta.
/// Un conjunto vacío es `Ok`, no un error.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct SearchCompleted {
    pub seq: u64,
    pub criteria: SearchCriteria,
    pub outcome: Result<ResultSet, SearchError>,
}

/// Reintenta la última búsqueda fallida con exactamente el mismo criterio.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct RetryLastSearch;
