use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix::prelude::*;
use colored::Color;

use common::constants::{
    EXTERNAL_NAV_URL, FIT_BOUNDS_PADDING, ROUTE_DASH_STEP, ROUTE_DASH_TICK_MILLIS,
    ROUTE_ESTIMATE_TIMEOUT_SECS,
};
use common::logger::Logger;
use common::messages::{HideRoute, OpenExternalNavigation, ProvideEstimate, ShowRoute};
use common::types::position::Position;
use common::types::route::RouteEstimate;

use crate::messages::{EstimateView, GetOverlayStatus, OverlayStatus};
use crate::surface::{MapSurface, MarkerIcon, PolylineStyle, SurfaceHandle};

/// Salida hacia la app de navegación externa. En producción abre el
/// navegador del sistema; en tests registra la URL.
pub trait UrlOpener: Send {
    fn open(&self, url: &str);
}

pub struct ConsoleOpener {
    logger: Logger,
}

impl ConsoleOpener {
    pub fn new() -> Self {
        Self {
            logger: Logger::new("Navigation", Color::Yellow),
        }
    }
}

impl UrlOpener for ConsoleOpener {
    fn open(&self, url: &str) {
        self.logger.info(format!("opening external navigation: {}", url));
    }
}

#[derive(Clone)]
pub struct RecordingOpener {
    urls: Arc<Mutex<Vec<String>>>,
}

impl RecordingOpener {
    pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let urls = Arc::new(Mutex::new(Vec::new()));
        (Self { urls: urls.clone() }, urls)
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) {
        self.urls.lock().unwrap().push(url.to_string());
    }
}

enum EstimateState {
    Calculating,
    Known(RouteEstimate),
    Unavailable,
}

struct ActiveRoute {
    start: Position,
    end: Position,
    label: String,
    estimate: EstimateState,
    start_marker: SurfaceHandle,
    end_marker: SurfaceHandle,
    line: SurfaceHandle,
    dash_offset: u32,
    anim: SpawnHandle,
    timeout: Option<SpawnHandle>,
}

/// Actor `RouteOverlayController`: overlay efímero de vista previa de
/// ruta sobre su propia superficie. A lo sumo una ruta activa; mostrar
/// una nueva siempre destruye y reconstruye el overlay entero.
pub struct RouteOverlayController {
    surface: Box<dyn MapSurface>,
    opener: Box<dyn UrlOpener>,
    active: Option<ActiveRoute>,
    last_nav_url: Option<String>,
    dash_tick: Duration,
    estimate_timeout: Duration,
    logger: Logger,
}

impl RouteOverlayController {
    pub fn new(surface: Box<dyn MapSurface>, opener: Box<dyn UrlOpener>) -> Self {
        Self {
            surface,
            opener,
            active: None,
            last_nav_url: None,
            dash_tick: Duration::from_millis(ROUTE_DASH_TICK_MILLIS),
            estimate_timeout: Duration::from_secs(ROUTE_ESTIMATE_TIMEOUT_SECS),
            logger: Logger::new("Route Overlay", Color::Magenta),
        }
    }

    /// Tiempos cortos para tests.
    pub fn with_timing(mut self, dash_tick: Duration, estimate_timeout: Duration) -> Self {
        self.dash_tick = dash_tick;
        self.estimate_timeout = estimate_timeout;
        self
    }

    fn teardown(&mut self, ctx: &mut Context<Self>) {
        if let Some(route) = self.active.take() {
            ctx.cancel_future(route.anim);
            if let Some(timeout) = route.timeout {
                ctx.cancel_future(timeout);
            }
            self.surface.remove_marker(route.start_marker);
            self.surface.remove_marker(route.end_marker);
            self.surface.remove_polyline(route.line);
        }
    }

    fn show_panel(&self, estimate: &RouteEstimate, label: &str) {
        self.logger.info(format!(
            "{} ({})",
            estimate.duration,
            common::utils::format_distance(estimate.distance_km)
        ));
        for segment in estimate.segments(label) {
            self.logger
                .info(format!("  {} · {}", segment.instruction, segment.distance));
        }
    }
}

impl Actor for RouteOverlayController {
    type Context = Context<Self>;
}

impl Handler<ShowRoute> for RouteOverlayController {
    type Result = ();

    fn handle(&mut self, msg: ShowRoute, ctx: &mut Self::Context) {
        self.teardown(ctx);
        self.logger
            .info(format!("showing route preview to '{}'", msg.label));

        self.surface.init(msg.start, 14);
        let start_marker = self.surface.add_marker(msg.start, MarkerIcon::RouteStart);
        self.surface
            .bind_popup(start_marker, "Tu ubicación".to_string());
        let end_marker = self.surface.add_marker(msg.end, MarkerIcon::RouteEnd);
        self.surface.bind_popup(end_marker, msg.label.clone());
        let line = self
            .surface
            .add_polyline(&[msg.start, msg.end], PolylineStyle::route_preview());
        self.surface
            .fit_bounds(&[msg.start, msg.end], FIT_BOUNDS_PADDING);

        // La línea "fluye" corriendo el guión un paso por tick.
        let anim = ctx.run_interval(self.dash_tick, |act, _ctx| {
            if let Some(route) = act.active.as_mut() {
                route.dash_offset = route.dash_offset.wrapping_add(ROUTE_DASH_STEP);
                let mut style = PolylineStyle::route_preview();
                style.dash_offset = route.dash_offset;
                act.surface.style_polyline(route.line, style);
            }
        });

        let (estimate, timeout) = match msg.estimate {
            Some(estimate) => {
                self.show_panel(&estimate, &msg.label);
                (EstimateState::Known(estimate), None)
            }
            None => {
                // Si la estimación nunca llega, el panel degrada en vez
                // de quedarse "calculando" para siempre.
                let handle = ctx.run_later(self.estimate_timeout, |act, _ctx| {
                    if let Some(route) = act.active.as_mut() {
                        if matches!(route.estimate, EstimateState::Calculating) {
                            route.estimate = EstimateState::Unavailable;
                            route.timeout = None;
                            act.logger.warn("route estimate timed out");
                        }
                    }
                });
                (EstimateState::Calculating, Some(handle))
            }
        };

        self.active = Some(ActiveRoute {
            start: msg.start,
            end: msg.end,
            label: msg.label,
            estimate,
            start_marker,
            end_marker,
            line,
            dash_offset: 0,
            anim,
            timeout,
        });
    }
}

impl Handler<ProvideEstimate> for RouteOverlayController {
    type Result = ();

    fn handle(&mut self, msg: ProvideEstimate, ctx: &mut Self::Context) {
        let Some(label) = self.active.as_ref().map(|route| route.label.clone()) else {
            return;
        };
        self.show_panel(&msg.estimate, &label);
        if let Some(route) = self.active.as_mut() {
            if let Some(timeout) = route.timeout.take() {
                ctx.cancel_future(timeout);
            }
            route.estimate = EstimateState::Known(msg.estimate);
        }
    }
}

impl Handler<HideRoute> for RouteOverlayController {
    type Result = ();

    fn handle(&mut self, _msg: HideRoute, ctx: &mut Self::Context) {
        if self.active.is_some() {
            self.logger.info("hiding route preview");
        }
        self.teardown(ctx);
    }
}

impl Handler<OpenExternalNavigation> for RouteOverlayController {
    type Result = ();

    fn handle(&mut self, _msg: OpenExternalNavigation, _ctx: &mut Self::Context) {
        let Some(route) = self.active.as_ref() else {
            return;
        };
        let url = format!(
            "{}&origin={},{}&destination={},{}&travelmode=driving",
            EXTERNAL_NAV_URL,
            route.start.latitud,
            route.start.longitud,
            route.end.latitud,
            route.end.longitud
        );
        self.opener.open(&url);
        self.last_nav_url = Some(url);
    }
}

impl Handler<GetOverlayStatus> for RouteOverlayController {
    type Result = MessageResult<GetOverlayStatus>;

    fn handle(&mut self, _msg: GetOverlayStatus, _ctx: &mut Self::Context) -> Self::Result {
        let estimate = self.active.as_ref().map(|route| match route.estimate {
            EstimateState::Calculating => EstimateView::Calculating,
            EstimateState::Known(_) => EstimateView::Known,
            EstimateState::Unavailable => EstimateView::Unavailable,
        });
        let segments = self
            .active
            .as_ref()
            .and_then(|route| match &route.estimate {
                EstimateState::Known(estimate) => Some(estimate.segments(&route.label)),
                _ => None,
            })
            .unwrap_or_default();
        MessageResult(OverlayStatus {
            active: self.active.is_some(),
            estimate,
            segments,
            dash_offset: self.active.as_ref().map(|r| r.dash_offset).unwrap_or(0),
            last_nav_url: self.last_nav_url.clone(),
        })
    }
}
