use std::sync::Arc;
use std::time::Duration;

use actix::fut::wrap_future;
use actix::prelude::*;
use colored::Color;

use common::constants::SEARCH_DEBOUNCE_MILLIS;
use common::logger::Logger;
use common::messages::{SearchCompleted, SearchRequest};
use common::types::criteria::SearchCriteria;
use common::types::errors::{ApiError, SearchError};
use common::types::restaurant::{ResultOrigin, ResultSet, RestaurantWithDistance};

use crate::api::{RestaurantBackend, SearchQuery};

/// Actor `SearchCoordinator`: recibe criterios de búsqueda, los somete a
/// debounce, despacha la consulta que corresponda al backend y entrega
/// el resultado anotado a su sink.
///
/// ## Disciplina de concurrencia
/// Cada despacho lleva un número de secuencia creciente. Una respuesta
/// que resuelve cuando ya se emitió una búsqueda más nueva se descarta:
/// gana la última emitida, no la última en completarse.
pub struct SearchCoordinator {
    api: Arc<dyn RestaurantBackend>,
    sink: Recipient<SearchCompleted>,
    seq: u64,
    pending: Option<SpawnHandle>,
    debounce: Duration,
    logger: Logger,
}

impl SearchCoordinator {
    pub fn new(api: Arc<dyn RestaurantBackend>, sink: Recipient<SearchCompleted>) -> Self {
        Self {
            api,
            sink,
            seq: 0,
            pending: None,
            debounce: Duration::from_millis(SEARCH_DEBOUNCE_MILLIS),
            logger: Logger::new("Search Coordinator", Color::Magenta),
        }
    }

    /// Debounce configurable, para tests.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    fn dispatch(&mut self, criteria: SearchCriteria, ctx: &mut Context<Self>) {
        self.seq += 1;
        let seq = self.seq;
        self.logger
            .info(format!("Dispatching search #{}: {}", seq, criteria.describe()));

        let api = self.api.clone();
        let request_criteria = criteria.clone();
        let fut = wrap_future::<_, Self>(async move {
            Self::perform(api, request_criteria).await
        })
        .map(move |outcome, act, _ctx| {
            if seq != act.seq {
                act.logger.warn(format!(
                    "Discarding superseded search #{} (latest is #{})",
                    seq, act.seq
                ));
                return;
            }
            match &outcome {
                Ok(results) => act
                    .logger
                    .info(format!("Search #{} resolved with {} results", seq, results.len())),
                Err(_) => act.logger.error(format!("Search #{} failed", seq)),
            }
            act.sink.do_send(SearchCompleted {
                seq,
                criteria,
                outcome,
            });
        });
        ctx.spawn(fut);
    }

    /// Ejecuta la consulta. La posición solo filtra en modo `Nearby` o
    /// con radio explícito; en los demás casos anota distancias nada más.
    async fn perform(
        api: Arc<dyn RestaurantBackend>,
        criteria: SearchCriteria,
    ) -> Result<ResultSet, SearchError> {
        let raw: Result<Vec<RestaurantWithDistance>, ApiError> = match &criteria {
            SearchCriteria::Nearby {
                position,
                radius_km,
            } => api.nearby(*position, *radius_km).await,
            SearchCriteria::Text {
                term,
                position,
                radius_km,
            } => {
                api.search(&SearchQuery {
                    termino: Some(term.clone()),
                    categoria: None,
                    latitud: position.map(|p| p.latitud),
                    longitud: position.map(|p| p.longitud),
                    radio: *radius_km,
                })
                .await
            }
            SearchCriteria::Category {
                name,
                position,
                radius_km,
            } => {
                api.search(&SearchQuery {
                    termino: None,
                    categoria: Some(name.clone()),
                    latitud: position.map(|p| p.latitud),
                    longitud: position.map(|p| p.longitud),
                    radio: *radius_km,
                })
                .await
            }
        };

        match raw {
            Ok(entries) => {
                // Un resultado vacío es un estado válido, no un error.
                let mut results = ResultSet::new(ResultOrigin::Search, entries);
                if let Some(position) = criteria.position() {
                    results.fill_missing_distances(position);
                }
                Ok(results)
            }
            Err(_) => Err(SearchError::Network { criteria }),
        }
    }
}

impl Actor for SearchCoordinator {
    type Context = Context<Self>;
}

impl Handler<SearchRequest> for SearchCoordinator {
    type Result = ();

    /// Un pedido nuevo dentro de la ventana de debounce reemplaza al que
    /// todavía no se despachó.
    fn handle(&mut self, msg: SearchRequest, ctx: &mut Self::Context) {
        if let Some(handle) = self.pending.take() {
            ctx.cancel_future(handle);
        }
        let criteria = msg.criteria;
        let handle = ctx.run_later(self.debounce, move |act, ctx| {
            act.pending = None;
            act.dispatch(criteria, ctx);
        });
        self.pending = Some(handle);
    }
}
