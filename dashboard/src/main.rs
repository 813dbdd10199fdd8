use std::env;
use std::sync::Arc;

use actix::prelude::*;
use tokio::signal::ctrl_c;

use common::constants::DEFAULT_MAP_CENTER;
use common::messages::{LoadFavorites, SetSurfaceReady, StartTracking, SubscribePosition};
use common::session::SessionContext;
use common::types::position::Position;

use dashboard::actors::dashboard::{DashboardController, Downstream};
use dashboard::actors::favorite_store::FavoriteStore;
use dashboard::actors::map_sync::MapViewSynchronizer;
use dashboard::actors::position_tracker::PositionTracker;
use dashboard::actors::route_overlay::{ConsoleOpener, RouteOverlayController};
use dashboard::actors::search_coordinator::SearchCoordinator;
use dashboard::actors::wizard::RecommendationWizard;
use dashboard::api::recommendations::HttpRecommendationApi;
use dashboard::api::restaurants::HttpRestaurantApi;
use dashboard::config::Config;
use dashboard::geo::SimulatedGeolocator;
use dashboard::surface::ConsoleSurface;

#[actix::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env();
    let session = match env::var("QUOVI_TOKEN") {
        Ok(token) => SessionContext::authenticated(token),
        Err(_) => SessionContext::anonymous(),
    };

    let restaurants = Arc::new(HttpRestaurantApi::new(config.api_base_url.clone()));
    let recommendations = Arc::new(HttpRecommendationApi::new(config.ai_base_url.clone()));

    let tracker = PositionTracker::new(Arc::new(SimulatedGeolocator::new(
        Position::new(DEFAULT_MAP_CENTER.0, DEFAULT_MAP_CENTER.1),
        0.01,
    )))
    .start();

    let favorites_api = restaurants.clone();
    let wizard_api = recommendations.clone();
    let tracker_for_wiring = tracker.clone();

    // El dashboard es el sink de casi todos los demás actores, así que
    // se construye adentro de `create` para poder cerrar el ciclo.
    let _dashboard = DashboardController::create(move |ctx| {
        let dashboard = ctx.address();

        let map = MapViewSynchronizer::new(
            Box::new(ConsoleSurface::new("Main Map")),
            dashboard.clone().recipient(),
        )
        .start();
        let route = RouteOverlayController::new(
            Box::new(ConsoleSurface::new("Route Map")),
            Box::new(ConsoleOpener::new()),
        )
        .start();
        let search =
            SearchCoordinator::new(restaurants.clone(), dashboard.clone().recipient()).start();
        let favorites = FavoriteStore::new(
            favorites_api,
            session.clone(),
            dashboard.clone().recipient(),
        )
        .start();
        if session.is_authenticated() {
            favorites.do_send(LoadFavorites { position: None });
        }
        let wizard = RecommendationWizard::new(
            wizard_api,
            dashboard.clone().recipient(),
            dashboard.clone().recipient(),
        )
        .start();

        tracker_for_wiring.do_send(SubscribePosition {
            recipient: dashboard.clone().recipient(),
        });
        tracker_for_wiring.do_send(SubscribePosition {
            recipient: wizard.recipient(),
        });
        map.do_send(SetSurfaceReady);

        DashboardController::new(Downstream {
            search: search.recipient(),
            favorite_snapshot: favorites.recipient(),
            map: map.recipient(),
            route: route.recipient(),
            refresh: tracker_for_wiring.clone().recipient(),
        })
    });

    tracker.do_send(StartTracking { continuous: true });

    tokio::select! {
        _ = ctrl_c() => {
            println!("Ctrl-C recibido, apagando...");
            actix::System::current().stop();
        }
    }
    Ok(())
}
