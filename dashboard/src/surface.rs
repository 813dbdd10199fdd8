use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix::prelude::*;

use common::logger::Logger;
use common::messages::MarkerClicked;
use common::types::position::Position;
use common::types::restaurant::RestaurantId;

/// Handle opaco a un objeto dibujado en la superficie del mapa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Ícono de marcador. La superficie decide cómo dibujarlo; acá solo
/// viaja la intención.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerIcon {
    Restaurant {
        emoji: String,
        color: String,
        favorite: bool,
    },
    CurrentPosition,
    RouteStart,
    RouteEnd,
}

/// Estilo de una polilínea, incluyendo el corrimiento del guión que
/// anima la "ruta fluyendo".
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineStyle {
    pub color: String,
    pub weight: u32,
    pub opacity: f64,
    pub dash_array: Option<String>,
    pub dash_offset: u32,
}

impl PolylineStyle {
    /// Estilo de la línea de vista previa de ruta.
    pub fn route_preview() -> Self {
        Self {
            color: "#f97316".to_string(),
            weight: 4,
            opacity: 0.8,
            dash_array: Some("10, 10".to_string()),
            dash_offset: 0,
        }
    }
}

/// Contrato de capacidades de la superficie de mapa. El motor depende
/// solo de esta interfaz; la tecnología de render concreta queda afuera.
pub trait MapSurface: Send {
    fn init(&mut self, center: Position, zoom: u8);
    fn add_marker(&mut self, at: Position, icon: MarkerIcon) -> SurfaceHandle;
    fn remove_marker(&mut self, handle: SurfaceHandle);
    fn bind_popup(&mut self, handle: SurfaceHandle, html: String);
    fn fit_bounds(&mut self, coords: &[Position], padding: u32);
    fn on_marker_click(
        &mut self,
        handle: SurfaceHandle,
        id: RestaurantId,
        recipient: Recipient<MarkerClicked>,
    );
    fn add_polyline(&mut self, coords: &[Position], style: PolylineStyle) -> SurfaceHandle;
    fn remove_polyline(&mut self, handle: SurfaceHandle);
    fn style_polyline(&mut self, handle: SurfaceHandle, style: PolylineStyle);
}

/// Operación registrada por la superficie de prueba.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Init { zoom: u8 },
    AddMarker(SurfaceHandle),
    RemoveMarker(SurfaceHandle),
    BindPopup(SurfaceHandle),
    FitBounds { points: usize, padding: u32 },
    AddPolyline(SurfaceHandle),
    RemovePolyline(SurfaceHandle),
    StylePolyline { handle: SurfaceHandle, dash_offset: u32 },
}

impl SurfaceOp {
    /// Las mutaciones de marcadores, para la propiedad de idempotencia.
    pub fn is_marker_mutation(&self) -> bool {
        matches!(
            self,
            SurfaceOp::AddMarker(_) | SurfaceOp::RemoveMarker(_) | SurfaceOp::BindPopup(_)
        )
    }
}

#[derive(Default)]
pub struct SurfaceState {
    pub ops: Vec<SurfaceOp>,
    pub markers: HashMap<SurfaceHandle, (Position, MarkerIcon)>,
    pub popups: HashMap<SurfaceHandle, String>,
    pub polylines: HashMap<SurfaceHandle, (Vec<Position>, PolylineStyle)>,
    pub clicks: HashMap<SurfaceHandle, (RestaurantId, Recipient<MarkerClicked>)>,
    pub initialized: Option<(Position, u8)>,
    next_handle: u64,
}

impl SurfaceState {
    fn next(&mut self) -> SurfaceHandle {
        self.next_handle += 1;
        SurfaceHandle(self.next_handle)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn polyline_count(&self) -> usize {
        self.polylines.len()
    }

    /// Ids de restaurante con marcador vivo (excluye posición y ruta).
    pub fn restaurant_marker_ids(&self) -> Vec<RestaurantId> {
        let mut ids: Vec<RestaurantId> = self
            .markers
            .iter()
            .filter(|(_, (_, icon))| matches!(icon, MarkerIcon::Restaurant { .. }))
            .filter_map(|(handle, _)| self.clicks.get(handle).map(|(id, _)| *id))
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn marker_mutations(&self) -> usize {
        self.ops.iter().filter(|op| op.is_marker_mutation()).count()
    }

    /// Simula un click del usuario sobre el marcador de un restaurante.
    pub fn click_marker(&self, id: RestaurantId) {
        for (bound_id, recipient) in self.clicks.values() {
            if *bound_id == id {
                recipient.do_send(MarkerClicked { id });
                return;
            }
        }
    }
}

/// Doble de prueba: registra cada llamada en vez de dibujar tiles.
/// El estado se comparte con el test a través de un `Arc`.
#[derive(Clone)]
pub struct RecordingSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl RecordingSurface {
    pub fn new() -> (Self, Arc<Mutex<SurfaceState>>) {
        let state = Arc::new(Mutex::new(SurfaceState::default()));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

impl MapSurface for RecordingSurface {
    fn init(&mut self, center: Position, zoom: u8) {
        let mut state = self.state.lock().unwrap();
        state.initialized = Some((center, zoom));
        state.ops.push(SurfaceOp::Init { zoom });
    }

    fn add_marker(&mut self, at: Position, icon: MarkerIcon) -> SurfaceHandle {
        let mut state = self.state.lock().unwrap();
        let handle = state.next();
        state.markers.insert(handle, (at, icon));
        state.ops.push(SurfaceOp::AddMarker(handle));
        handle
    }

    fn remove_marker(&mut self, handle: SurfaceHandle) {
        let mut state = self.state.lock().unwrap();
        state.markers.remove(&handle);
        state.popups.remove(&handle);
        state.clicks.remove(&handle);
        state.ops.push(SurfaceOp::RemoveMarker(handle));
    }

    fn bind_popup(&mut self, handle: SurfaceHandle, html: String) {
        let mut state = self.state.lock().unwrap();
        state.popups.insert(handle, html);
        state.ops.push(SurfaceOp::BindPopup(handle));
    }

    fn fit_bounds(&mut self, coords: &[Position], padding: u32) {
        let mut state = self.state.lock().unwrap();
        state.ops.push(SurfaceOp::FitBounds {
            points: coords.len(),
            padding,
        });
    }

    fn on_marker_click(
        &mut self,
        handle: SurfaceHandle,
        id: RestaurantId,
        recipient: Recipient<MarkerClicked>,
    ) {
        let mut state = self.state.lock().unwrap();
        state.clicks.insert(handle, (id, recipient));
    }

    fn add_polyline(&mut self, coords: &[Position], style: PolylineStyle) -> SurfaceHandle {
        let mut state = self.state.lock().unwrap();
        let handle = state.next();
        state.polylines.insert(handle, (coords.to_vec(), style));
        state.ops.push(SurfaceOp::AddPolyline(handle));
        handle
    }

    fn remove_polyline(&mut self, handle: SurfaceHandle) {
        let mut state = self.state.lock().unwrap();
        state.polylines.remove(&handle);
        state.ops.push(SurfaceOp::RemovePolyline(handle));
    }

    fn style_polyline(&mut self, handle: SurfaceHandle, style: PolylineStyle) {
        let mut state = self.state.lock().unwrap();
        let dash_offset = style.dash_offset;
        if let Some(entry) = state.polylines.get_mut(&handle) {
            entry.1 = style;
        }
        state.ops.push(SurfaceOp::StylePolyline {
            handle,
            dash_offset,
        });
    }
}

/// Superficie de demo: loguea cada operación en la consola.
pub struct ConsoleSurface {
    logger: Logger,
    inner: RecordingSurface,
}

impl ConsoleSurface {
    pub fn new(name: impl Into<String>) -> Self {
        let (inner, _) = RecordingSurface::new();
        Self {
            logger: Logger::new(name, colored::Color::Cyan),
            inner,
        }
    }
}

impl MapSurface for ConsoleSurface {
    fn init(&mut self, center: Position, zoom: u8) {
        self.logger.info(format!(
            "map init at ({:.4}, {:.4}) zoom {}",
            center.latitud, center.longitud, zoom
        ));
        self.inner.init(center, zoom);
    }

    fn add_marker(&mut self, at: Position, icon: MarkerIcon) -> SurfaceHandle {
        let handle = self.inner.add_marker(at, icon.clone());
        self.logger.info(format!(
            "add marker {:?} at ({:.4}, {:.4}) [{:?}]",
            handle, at.latitud, at.longitud, icon
        ));
        handle
    }

    fn remove_marker(&mut self, handle: SurfaceHandle) {
        self.logger.info(format!("remove marker {:?}", handle));
        self.inner.remove_marker(handle);
    }

    fn bind_popup(&mut self, handle: SurfaceHandle, html: String) {
        self.inner.bind_popup(handle, html);
    }

    fn fit_bounds(&mut self, coords: &[Position], padding: u32) {
        self.logger.info(format!(
            "fit bounds over {} points (padding {})",
            coords.len(),
            padding
        ));
        self.inner.fit_bounds(coords, padding);
    }

    fn on_marker_click(
        &mut self,
        handle: SurfaceHandle,
        id: RestaurantId,
        recipient: Recipient<MarkerClicked>,
    ) {
        self.inner.on_marker_click(handle, id, recipient);
    }

    fn add_polyline(&mut self, coords: &[Position], style: PolylineStyle) -> SurfaceHandle {
        let handle = self.inner.add_polyline(coords, style);
        self.logger
            .info(format!("add polyline {:?} ({} points)", handle, coords.len()));
        handle
    }

    fn remove_polyline(&mut self, handle: SurfaceHandle) {
        self.logger.info(format!("remove polyline {:?}", handle));
        self.inner.remove_polyline(handle);
    }

    fn style_polyline(&mut self, handle: SurfaceHandle, style: PolylineStyle) {
        self.inner.style_polyline(handle, style);
    }
}
