use std::collections::HashSet;

use actix::fut::wrap_future;
use actix::prelude::*;
use colored::Color;

use common::constants::DEFAULT_RADIUS_KM;
use common::logger::Logger;
use common::messages::{
    FavoriteSnapshot, FavoritesChanged, MarkerClicked, PositionUpdate, RecommendationsReady,
    RefreshOnce, RenderResults, RetryLastSearch, SearchCompleted, SearchRequest, ShowRoute,
    ShowRestaurantOnMap,
};
use common::types::criteria::SearchCriteria;
use common::types::errors::{GeoError, SearchError};
use common::types::position::Position;
use common::types::restaurant::{RestaurantId, ResultSet};
use common::types::route::RouteEstimate;
use common::utils::{estimate_travel_time, haversine_km};

use crate::messages::{
    DashboardStatus, GetDashboardStatus, PreviewRoute, RetryLocation,
};

/// Destinatarios aguas abajo del dashboard. Se arma en el arranque (o en
/// el test) y se inyecta entero; el dashboard no conoce los tipos de los
/// actores detrás de cada `Recipient`.
pub struct Downstream {
    pub search: Recipient<SearchRequest>,
    pub favorite_snapshot: Recipient<FavoriteSnapshot>,
    pub map: Recipient<RenderResults>,
    pub route: Recipient<ShowRoute>,
    pub refresh: Recipient<RefreshOnce>,
}

/// Actor `DashboardController`: orquestador central de la pantalla de
/// descubrimiento. Es el único dueño del conjunto de resultados visible
/// y de la selección; los demás actores le reportan eventos y él decide
/// qué se busca, qué se dibuja y qué se ofrece reintentar.
///
/// Resultados de búsqueda y de recomendaciones entran por el mismo
/// camino: se anotan favoritos y distancias, se valida la selección y se
/// manda a renderizar, sin distinguir la fuente.
pub struct DashboardController {
    downstream: Downstream,
    position: Option<Position>,
    position_seq: u64,
    results: Option<ResultSet>,
    applied_seq: u64,
    selected: Option<RestaurantId>,
    favorites: HashSet<RestaurantId>,
    last_failed: Option<SearchCriteria>,
    retry_location: bool,
    searched_once: bool,
    logger: Logger,
}

impl DashboardController {
    pub fn new(downstream: Downstream) -> Self {
        Self {
            downstream,
            position: None,
            position_seq: 0,
            results: None,
            applied_seq: 0,
            selected: None,
            favorites: HashSet::new(),
            last_failed: None,
            retry_location: false,
            searched_once: false,
            logger: Logger::new("Dashboard", Color::Cyan),
        }
    }

    fn rerender(&self) {
        if let Some(results) = &self.results {
            self.downstream.map.do_send(RenderResults {
                results: results.clone(),
                position: self.position,
            });
        }
    }

    /// Camino único de adopción de resultados: pide la membresía de
    /// favoritos, anota el conjunto, revalida la selección y renderiza.
    fn adopt_results(&mut self, mut results: ResultSet, seq: u64, ctx: &mut Context<Self>) {
        if let Some(position) = self.position {
            results.fill_missing_distances(position);
        }
        let snapshot = self.downstream.favorite_snapshot.send(FavoriteSnapshot);
        ctx.spawn(wrap_future::<_, Self>(snapshot).map(
            move |membership, act, _ctx| {
                // Mientras esperábamos el snapshot pudo aplicarse una
                // búsqueda más nueva.
                if seq < act.applied_seq {
                    return;
                }
                if let Ok(membership) = membership {
                    act.favorites = membership;
                }
                results.annotate_favorites(&act.favorites);
                if let Some(selected) = act.selected {
                    if !results.contains(selected) {
                        act.selected = None;
                    }
                }
                act.results = Some(results);
                act.rerender();
            },
        ));
    }
}

impl Actor for DashboardController {
    type Context = Context<Self>;
}

impl Handler<PositionUpdate> for DashboardController {
    type Result = ();

    fn handle(&mut self, msg: PositionUpdate, _ctx: &mut Self::Context) {
        if msg.seq < self.position_seq {
            return;
        }
        self.position_seq = msg.seq;

        match msg.reading {
            Ok(position) => {
                self.retry_location = false;
                self.position = Some(position);
                if !self.searched_once {
                    // Primer fix: dispara la búsqueda de cercanos inicial.
                    self.searched_once = true;
                    self.downstream.search.do_send(SearchRequest {
                        criteria: SearchCriteria::Nearby {
                            position,
                            radius_km: DEFAULT_RADIUS_KM,
                        },
                    });
                } else if let Some(results) = self.results.as_mut() {
                    // Las anotaciones de distancia caducaron con la
                    // posición vieja.
                    results.annotate_distances(position);
                    self.rerender();
                }
            }
            Err(error) => {
                self.logger.warn(format!("location unavailable: {}", error));
                if error == GeoError::PermissionDenied {
                    self.retry_location = true;
                }
            }
        }
    }
}

impl Handler<SearchCompleted> for DashboardController {
    type Result = ();

    fn handle(&mut self, msg: SearchCompleted, ctx: &mut Self::Context) {
        if msg.seq < self.applied_seq {
            return;
        }
        self.applied_seq = msg.seq;

        match msg.outcome {
            Ok(results) => {
                self.last_failed = None;
                self.adopt_results(results, msg.seq, ctx);
            }
            Err(SearchError::Network { criteria }) => {
                self.logger
                    .error(format!("search failed: {}", criteria.describe()));
                self.last_failed = Some(criteria);
            }
        }
    }
}

impl Handler<RecommendationsReady> for DashboardController {
    type Result = ();

    fn handle(&mut self, msg: RecommendationsReady, ctx: &mut Self::Context) {
        self.logger
            .info(format!("{} recommendations adopted", msg.results.len()));
        let seq = self.applied_seq;
        self.adopt_results(msg.results, seq, ctx);
    }
}

impl Handler<FavoritesChanged> for DashboardController {
    type Result = ();

    fn handle(&mut self, msg: FavoritesChanged, _ctx: &mut Self::Context) {
        if let Some(error) = msg.error {
            self.logger.warn(format!("favorites: {}", error));
            return;
        }
        if msg.rolled_back {
            self.logger.warn("favorite toggle rolled back");
        }
        if msg.now_favorite {
            self.favorites.insert(msg.id);
        } else {
            self.favorites.remove(&msg.id);
        }
        if let Some(results) = self.results.as_mut() {
            results.annotate_favorites(&self.favorites);
        }
        self.rerender();
    }
}

impl Handler<MarkerClicked> for DashboardController {
    type Result = ();

    fn handle(&mut self, msg: MarkerClicked, _ctx: &mut Self::Context) {
        let known = self
            .results
            .as_ref()
            .map(|r| r.contains(msg.id))
            .unwrap_or(false);
        if known {
            self.selected = Some(msg.id);
        }
    }
}

impl Handler<ShowRestaurantOnMap> for DashboardController {
    type Result = ();

    fn handle(&mut self, msg: ShowRestaurantOnMap, _ctx: &mut Self::Context) {
        let known = self
            .results
            .as_ref()
            .map(|r| r.contains(msg.id))
            .unwrap_or(false);
        if known {
            self.selected = Some(msg.id);
        }
    }
}

impl Handler<PreviewRoute> for DashboardController {
    type Result = ();

    fn handle(&mut self, _msg: PreviewRoute, _ctx: &mut Self::Context) {
        let (Some(position), Some(selected), Some(results)) =
            (self.position, self.selected, self.results.as_ref())
        else {
            return;
        };
        let Some(entry) = results.get(selected) else {
            return;
        };
        let destination = entry.summary.position();
        let km = haversine_km(position, destination);
        self.downstream.route.do_send(ShowRoute {
            start: position,
            end: destination,
            label: entry.summary.name.clone(),
            estimate: Some(RouteEstimate {
                distance_km: km,
                duration: estimate_travel_time(km),
            }),
        });
    }
}

impl Handler<RetryLastSearch> for DashboardController {
    type Result = ();

    fn handle(&mut self, _msg: RetryLastSearch, _ctx: &mut Self::Context) {
        if let Some(criteria) = self.last_failed.take() {
            self.logger
                .info(format!("retrying search: {}", criteria.describe()));
            self.downstream.search.do_send(SearchRequest { criteria });
        }
    }
}

impl Handler<RetryLocation> for DashboardController {
    type Result = ();

    fn handle(&mut self, _msg: RetryLocation, _ctx: &mut Self::Context) {
        self.downstream.refresh.do_send(RefreshOnce);
    }
}

impl Handler<GetDashboardStatus> for DashboardController {
    type Result = MessageResult<GetDashboardStatus>;

    fn handle(&mut self, _msg: GetDashboardStatus, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(DashboardStatus {
            position: self.position,
            result_ids: self.results.as_ref().map(|r| r.ids()).unwrap_or_default(),
            selected: self.selected,
            retry_available: self.retry_location,
            has_failed_search: self.last_failed.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use common::session::SessionContext;
    use common::types::errors::ApiError;
    use common::types::restaurant::{
        Dish, ResultOrigin, RestaurantSummary, RestaurantWithDistance,
    };

    use crate::actors::favorite_store::FavoriteStore;
    use crate::actors::route_overlay::{RecordingOpener, RouteOverlayController};
    use crate::api::{RestaurantBackend, SearchQuery};
    use crate::surface::RecordingSurface;

    use super::*;

    fn cdmx() -> Position {
        Position::new(19.4326, -99.1332)
    }

    fn restaurant(id: RestaurantId, lat: f64, lng: f64) -> RestaurantWithDistance {
        RestaurantWithDistance {
            summary: RestaurantSummary {
                id,
                name: format!("Restaurante {}", id),
                categories: vec!["Tacos".to_string()],
                rating: 4.4,
                average_price: Some(150.0),
                latitud: lat,
                longitud: lng,
                is_open: true,
                hours_today: None,
                image: None,
            },
            distance_km: None,
            travel_time: None,
            is_favorite: false,
        }
    }

    fn search_ok(seq: u64, ids: &[RestaurantId]) -> SearchCompleted {
        SearchCompleted {
            seq,
            criteria: SearchCriteria::Nearby {
                position: cdmx(),
                radius_km: DEFAULT_RADIUS_KM,
            },
            outcome: Ok(ResultSet::new(
                ResultOrigin::Search,
                ids.iter()
                    .map(|id| restaurant(*id, 19.43 + *id as f64 * 0.001, -99.14))
                    .collect(),
            )),
        }
    }

    /// Backend mínimo para los tests de integración: los favoritos
    /// precargados son lo único que importa acá.
    struct InMemoryBackend {
        favorites: Vec<RestaurantWithDistance>,
    }

    #[async_trait]
    impl RestaurantBackend for InMemoryBackend {
        async fn nearby(
            &self,
            _position: Position,
            _radius_km: f64,
        ) -> Result<Vec<RestaurantWithDistance>, ApiError> {
            Ok(Vec::new())
        }

        async fn search(
            &self,
            _query: &SearchQuery,
        ) -> Result<Vec<RestaurantWithDistance>, ApiError> {
            Ok(Vec::new())
        }

        async fn favorites(
            &self,
            _session: &SessionContext,
            _position: Option<Position>,
        ) -> Result<Vec<RestaurantWithDistance>, ApiError> {
            Ok(self.favorites.clone())
        }

        async fn add_favorite(
            &self,
            _session: &SessionContext,
            _id: RestaurantId,
        ) -> Result<(), ApiError> {
            Ok(())
        }

        async fn remove_favorite(
            &self,
            _session: &SessionContext,
            _id: RestaurantId,
        ) -> Result<(), ApiError> {
            Ok(())
        }

        async fn dishes(&self, _id: RestaurantId) -> Result<Vec<Dish>, ApiError> {
            Ok(Vec::new())
        }
    }

    #[derive(Clone)]
    struct ProbeLog {
        searches: Vec<SearchCriteria>,
        renders: Vec<RenderResults>,
        routes: Vec<ShowRoute>,
        refreshes: u32,
    }

    /// Dobla todos los destinos aguas abajo del dashboard y registra lo
    /// que le llega.
    struct Probe {
        searches: Vec<SearchCriteria>,
        renders: Vec<RenderResults>,
        routes: Vec<ShowRoute>,
        refreshes: u32,
        snapshot: HashSet<RestaurantId>,
    }

    impl Probe {
        fn with_favorites(snapshot: HashSet<RestaurantId>) -> Self {
            Self {
                searches: Vec::new(),
                renders: Vec::new(),
                routes: Vec::new(),
                refreshes: 0,
                snapshot,
            }
        }
    }

    impl Actor for Probe {
        type Context = Context<Self>;
    }

    impl Handler<SearchRequest> for Probe {
        type Result = ();

        fn handle(&mut self, msg: SearchRequest, _ctx: &mut Self::Context) {
            self.searches.push(msg.criteria);
        }
    }

    impl Handler<RenderResults> for Probe {
        type Result = ();

        fn handle(&mut self, msg: RenderResults, _ctx: &mut Self::Context) {
            self.renders.push(msg);
        }
    }

    impl Handler<ShowRoute> for Probe {
        type Result = ();

        fn handle(&mut self, msg: ShowRoute, _ctx: &mut Self::Context) {
            self.routes.push(msg);
        }
    }

    impl Handler<RefreshOnce> for Probe {
        type Result = ();

        fn handle(&mut self, _msg: RefreshOnce, _ctx: &mut Self::Context) {
            self.refreshes += 1;
        }
    }

    impl Handler<FavoriteSnapshot> for Probe {
        type Result = MessageResult<FavoriteSnapshot>;

        fn handle(&mut self, _msg: FavoriteSnapshot, _ctx: &mut Self::Context) -> Self::Result {
            MessageResult(self.snapshot.clone())
        }
    }

    #[derive(Message)]
    #[rtype(result = "ProbeLog")]
    struct Drain;

    impl Handler<Drain> for Probe {
        type Result = MessageResult<Drain>;

        fn handle(&mut self, _msg: Drain, _ctx: &mut Self::Context) -> Self::Result {
            MessageResult(ProbeLog {
                searches: self.searches.clone(),
                renders: self.renders.clone(),
                routes: self.routes.clone(),
                refreshes: self.refreshes,
            })
        }
    }

    fn controller(probe: &Addr<Probe>) -> Addr<DashboardController> {
        DashboardController::new(Downstream {
            search: probe.clone().recipient(),
            favorite_snapshot: probe.clone().recipient(),
            map: probe.clone().recipient(),
            route: probe.clone().recipient(),
            refresh: probe.clone().recipient(),
        })
        .start()
    }

    #[actix_rt::test]
    async fn first_fix_triggers_the_initial_nearby_search() {
        let probe = Probe::with_favorites(HashSet::new()).start();
        let dashboard = controller(&probe);

        dashboard
            .send(PositionUpdate {
                seq: 1,
                reading: Ok(cdmx()),
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let log = probe.send(Drain).await.unwrap();
        assert_eq!(log.searches.len(), 1);
        match &log.searches[0] {
            SearchCriteria::Nearby { radius_km, .. } => {
                assert_eq!(*radius_km, DEFAULT_RADIUS_KM)
            }
            other => panic!("unexpected criteria {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn denied_permission_offers_retry_and_touches_nothing_else() {
        let probe = Probe::with_favorites(HashSet::new()).start();
        let dashboard = controller(&probe);

        dashboard
            .send(PositionUpdate {
                seq: 1,
                reading: Err(GeoError::PermissionDenied),
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let status = dashboard.send(GetDashboardStatus).await.unwrap();
        assert!(status.retry_available);
        assert!(status.position.is_none());

        let log = probe.send(Drain).await.unwrap();
        assert!(log.searches.is_empty(), "denial must not trigger a search");
        assert!(log.renders.is_empty(), "denial must not touch the map");

        // El reintento explícito va directo al tracker.
        dashboard.send(RetryLocation).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let log = probe.send(Drain).await.unwrap();
        assert_eq!(log.refreshes, 1);
    }

    #[actix_rt::test]
    async fn stale_position_updates_are_discarded() {
        let probe = Probe::with_favorites(HashSet::new()).start();
        let dashboard = controller(&probe);

        let fresh = Position::new(19.45, -99.15);
        dashboard
            .send(PositionUpdate {
                seq: 2,
                reading: Ok(fresh),
            })
            .await
            .unwrap();
        dashboard
            .send(PositionUpdate {
                seq: 1,
                reading: Ok(cdmx()),
            })
            .await
            .unwrap();

        let status = dashboard.send(GetDashboardStatus).await.unwrap();
        assert_eq!(status.position, Some(fresh));
    }

    #[actix_rt::test]
    async fn results_are_annotated_with_favorites_and_distances_before_render() {
        let probe = Probe::with_favorites([2].into_iter().collect()).start();
        let dashboard = controller(&probe);

        dashboard
            .send(PositionUpdate {
                seq: 1,
                reading: Ok(cdmx()),
            })
            .await
            .unwrap();
        dashboard.send(search_ok(1, &[1, 2])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let log = probe.send(Drain).await.unwrap();
        let render = log.renders.last().expect("a render must have happened");
        let favored = render.results.get(2).unwrap();
        assert!(favored.is_favorite);
        assert!(!render.results.get(1).unwrap().is_favorite);
        for entry in render.results.iter() {
            assert!(entry.distance_km.is_some());
        }
    }

    #[actix_rt::test]
    async fn selection_is_cleared_when_the_id_leaves_the_results() {
        let probe = Probe::with_favorites(HashSet::new()).start();
        let dashboard = controller(&probe);

        dashboard.send(search_ok(1, &[1, 2])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        dashboard.send(MarkerClicked { id: 2 }).await.unwrap();
        let status = dashboard.send(GetDashboardStatus).await.unwrap();
        assert_eq!(status.selected, Some(2));

        dashboard.send(search_ok(2, &[3])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let status = dashboard.send(GetDashboardStatus).await.unwrap();
        assert_eq!(status.selected, None);
        assert_eq!(status.result_ids, vec![3]);
    }

    #[actix_rt::test]
    async fn failed_search_is_retried_with_identical_criteria() {
        let probe = Probe::with_favorites(HashSet::new()).start();
        let dashboard = controller(&probe);

        let criteria = SearchCriteria::Text {
            term: "pozole".to_string(),
            position: Some(cdmx()),
            radius_km: None,
        };
        dashboard
            .send(SearchCompleted {
                seq: 1,
                criteria: criteria.clone(),
                outcome: Err(SearchError::Network {
                    criteria: criteria.clone(),
                }),
            })
            .await
            .unwrap();

        let status = dashboard.send(GetDashboardStatus).await.unwrap();
        assert!(status.has_failed_search);

        dashboard.send(RetryLastSearch).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let log = probe.send(Drain).await.unwrap();
        assert_eq!(log.searches, vec![criteria]);
        let status = dashboard.send(GetDashboardStatus).await.unwrap();
        assert!(!status.has_failed_search, "retry consumes the stored criteria");
    }

    #[actix_rt::test]
    async fn recommendations_flow_through_the_same_render_path() {
        let probe = Probe::with_favorites(HashSet::new()).start();
        let dashboard = controller(&probe);

        dashboard
            .send(PositionUpdate {
                seq: 1,
                reading: Ok(cdmx()),
            })
            .await
            .unwrap();
        let recommended = ResultSet::new(
            ResultOrigin::Recommendation,
            vec![restaurant(9, 19.45, -99.15), restaurant(4, 19.42, -99.12)],
        );
        dashboard
            .send(RecommendationsReady {
                results: recommended,
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let log = probe.send(Drain).await.unwrap();
        let render = log.renders.last().expect("recommendations must render");
        // El orden del servicio es el ranking: se preserva intacto.
        assert_eq!(render.results.ids(), vec![9, 4]);
        assert_eq!(render.results.origin, ResultOrigin::Recommendation);
    }

    #[actix_rt::test]
    async fn route_preview_needs_selection_and_position() {
        let probe = Probe::with_favorites(HashSet::new()).start();
        let dashboard = controller(&probe);

        // Sin posición ni selección: no pasa nada.
        dashboard.send(PreviewRoute).await.unwrap();

        dashboard
            .send(PositionUpdate {
                seq: 1,
                reading: Ok(cdmx()),
            })
            .await
            .unwrap();
        dashboard.send(search_ok(1, &[1])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        dashboard.send(MarkerClicked { id: 1 }).await.unwrap();
        dashboard.send(PreviewRoute).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let log = probe.send(Drain).await.unwrap();
        assert_eq!(log.routes.len(), 1);
        let route = &log.routes[0];
        assert_eq!(route.start, cdmx());
        assert_eq!(route.label, "Restaurante 1");
        let estimate = route.estimate.as_ref().unwrap();
        assert!(estimate.distance_km > 0.0);
    }

    #[actix_rt::test]
    async fn favorite_events_from_the_store_reannotate_results() {
        let api = Arc::new(InMemoryBackend {
            favorites: Vec::new(),
        });
        let probe = Probe::with_favorites(HashSet::new()).start();

        let mut store_slot = None;
        let dashboard = DashboardController::create(|ctx| {
            let store = FavoriteStore::new(
                api,
                SessionContext::authenticated("token-123"),
                ctx.address().recipient(),
            )
            .start();
            store_slot = Some(store.clone());
            DashboardController::new(Downstream {
                search: probe.clone().recipient(),
                favorite_snapshot: store.recipient(),
                map: probe.clone().recipient(),
                route: probe.clone().recipient(),
                refresh: probe.clone().recipient(),
            })
        });
        let store = store_slot.unwrap();

        dashboard.send(search_ok(1, &[1, 2])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        store
            .send(common::messages::ToggleFavorite { id: 2 })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let log = probe.send(Drain).await.unwrap();
        let render = log.renders.last().unwrap();
        assert!(render.results.get(2).unwrap().is_favorite);
        assert!(!render.results.get(1).unwrap().is_favorite);
    }

    #[actix_rt::test]
    async fn route_preview_reaches_the_overlay_end_to_end() {
        let probe = Probe::with_favorites(HashSet::new()).start();
        let (surface, state) = RecordingSurface::new();
        let (opener, _) = RecordingOpener::new();
        let overlay = RouteOverlayController::new(Box::new(surface), Box::new(opener)).start();

        let dashboard = DashboardController::new(Downstream {
            search: probe.clone().recipient(),
            favorite_snapshot: probe.clone().recipient(),
            map: probe.clone().recipient(),
            route: overlay.recipient(),
            refresh: probe.clone().recipient(),
        })
        .start();

        dashboard
            .send(PositionUpdate {
                seq: 1,
                reading: Ok(cdmx()),
            })
            .await
            .unwrap();
        dashboard.send(search_ok(1, &[1])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        dashboard.send(MarkerClicked { id: 1 }).await.unwrap();
        dashboard.send(PreviewRoute).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let state = state.lock().unwrap();
        assert_eq!(state.marker_count(), 2);
        assert_eq!(state.polyline_count(), 1);
    }
}
