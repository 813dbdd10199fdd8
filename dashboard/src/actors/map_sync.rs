use std::collections::{HashMap, HashSet};

use actix::prelude::*;
use colored::Color;

use common::constants::{DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, FIT_BOUNDS_PADDING};
use common::logger::Logger;
use common::messages::{MarkerClicked, RenderResults, SetSurfaceReady};
use common::types::position::Position;
use common::types::restaurant::{RestaurantId, RestaurantWithDistance};
use common::utils::{format_distance, price_tier};

use crate::surface::{MapSurface, MarkerIcon, SurfaceHandle};

/// Emoji con el que se dibuja cada categoría en su marcador.
fn category_emoji(category: Option<&str>) -> &'static str {
    match category {
        Some("Mexicana") | Some("Tacos") | Some("Antojitos") => "🌮",
        Some("Italiana") | Some("Pizza") => "🍕",
        Some("Japonesa") | Some("Sushi") => "🍣",
        Some("Cafetería") | Some("Café") => "☕",
        Some("Comida Saludable") | Some("Saludable") => "🥗",
        Some("Hamburguesas") => "🍔",
        Some("Mariscos") => "🦐",
        Some("Postres") => "🍰",
        Some("Desayunos") => "🍳",
        _ => "🍽️",
    }
}

fn category_color(category: Option<&str>) -> &'static str {
    match category {
        Some("Mexicana") | Some("Tacos") => "red",
        Some("Italiana") | Some("Pizza") => "orange",
        Some("Japonesa") | Some("Sushi") | Some("Postres") => "pink",
        Some("Cafetería") | Some("Café") => "blue",
        Some("Comida Saludable") | Some("Saludable") => "green",
        Some("Hamburguesas") => "purple",
        Some("Mariscos") => "cyan",
        _ => "gray",
    }
}

fn restaurant_icon(entry: &RestaurantWithDistance) -> MarkerIcon {
    let category = entry.summary.categories.first().map(|c| c.as_str());
    MarkerIcon::Restaurant {
        emoji: category_emoji(category).to_string(),
        color: category_color(category).to_string(),
        favorite: entry.is_favorite,
    }
}

fn popup_html(entry: &RestaurantWithDistance) -> String {
    let distance = entry
        .distance_km
        .map(|km| format!(" · {}", format_distance(km)))
        .unwrap_or_default();
    let estado = if entry.summary.is_open {
        "Abierto"
    } else {
        "Cerrado"
    };
    format!(
        "<div class=\"text-center\"><div class=\"font-semibold\">{}</div>\
         <div>{:.1} ⭐ · {}{}</div><div>{}</div>\
         <button>Ver menú</button></div>",
        entry.summary.name,
        entry.summary.rating,
        price_tier(entry.summary.average_price),
        distance,
        estado
    )
}

struct MarkerEntry {
    handle: SurfaceHandle,
    icon: MarkerIcon,
    popup: String,
}

/// Actor `MapViewSynchronizer`: dueño exclusivo del registro de
/// marcadores. Reconcilia la superficie contra cada conjunto de
/// resultados por diferencia simétrica: saca lo que ya no está, agrega
/// lo nuevo y actualiza en el lugar lo que cambió.
///
/// El marcador de posición actual es una entrada distinguida que se
/// reemplaza entero en cada actualización de posición, sin diffing.
///
/// La superficie puede no estar lista todavía cuando llegan resultados:
/// esos renders se encolan (coalescidos, gana el último) y se aplican al
/// recibir `SetSurfaceReady`. Nunca se lanza un error por eso.
pub struct MapViewSynchronizer {
    surface: Box<dyn MapSurface>,
    ready: bool,
    registry: HashMap<RestaurantId, MarkerEntry>,
    position_marker: Option<SurfaceHandle>,
    last_position: Option<Position>,
    selection: Recipient<MarkerClicked>,
    pending: Option<RenderResults>,
    in_render: bool,
    queued: Option<RenderResults>,
    logger: Logger,
}

impl MapViewSynchronizer {
    pub fn new(surface: Box<dyn MapSurface>, selection: Recipient<MarkerClicked>) -> Self {
        Self {
            surface,
            ready: false,
            registry: HashMap::new(),
            position_marker: None,
            last_position: None,
            selection,
            pending: None,
            in_render: false,
            queued: None,
            logger: Logger::new("Map Synchronizer", Color::Green),
        }
    }

    fn apply(&mut self, msg: RenderResults) {
        self.in_render = true;
        let mut mutated = false;

        let new_ids: HashSet<RestaurantId> = msg.results.ids().into_iter().collect();

        // Marcadores cuyo id desapareció del conjunto.
        let stale: Vec<RestaurantId> = self
            .registry
            .keys()
            .filter(|id| !new_ids.contains(id))
            .copied()
            .collect();
        for id in stale {
            if let Some(entry) = self.registry.remove(&id) {
                self.surface.remove_marker(entry.handle);
                mutated = true;
            }
        }

        // Altas y actualizaciones, en el orden del conjunto (ranking).
        for restaurant in msg.results.iter() {
            let id = restaurant.id();
            let icon = restaurant_icon(restaurant);
            let popup = popup_html(restaurant);
            let position = restaurant.summary.position();

            // Primero se decide, después se muta: la decisión suelta el
            // préstamo del registro antes de tocar la superficie.
            enum Plan {
                Add,
                Replace(SurfaceHandle),
                Rebind(SurfaceHandle),
                Keep,
            }
            let plan = match self.registry.get(&id) {
                None => Plan::Add,
                // El contrato de la superficie no permite cambiar un
                // ícono in situ: se reemplaza el marcador bajo el mismo
                // id del registro.
                Some(existing) if existing.icon != icon => Plan::Replace(existing.handle),
                Some(existing) if existing.popup != popup => Plan::Rebind(existing.handle),
                Some(_) => Plan::Keep,
            };
            match plan {
                Plan::Add | Plan::Replace(_) => {
                    if let Plan::Replace(old) = plan {
                        self.surface.remove_marker(old);
                    }
                    let handle = self.surface.add_marker(position, icon.clone());
                    self.surface.bind_popup(handle, popup.clone());
                    self.surface
                        .on_marker_click(handle, id, self.selection.clone());
                    self.registry.insert(id, MarkerEntry { handle, icon, popup });
                    mutated = true;
                }
                Plan::Rebind(handle) => {
                    self.surface.bind_popup(handle, popup.clone());
                    if let Some(entry) = self.registry.get_mut(&id) {
                        entry.popup = popup;
                    }
                    mutated = true;
                }
                Plan::Keep => {}
            }
        }

        // Posición actual: reemplazo entero, nunca diff.
        if msg.position != self.last_position {
            if let Some(handle) = self.position_marker.take() {
                self.surface.remove_marker(handle);
            }
            if let Some(position) = msg.position {
                let handle = self
                    .surface
                    .add_marker(position, MarkerIcon::CurrentPosition);
                self.surface
                    .bind_popup(handle, "Tu ubicación actual".to_string());
                self.position_marker = Some(handle);
            }
            self.last_position = msg.position;
            mutated = true;
        }

        // Con resultados, el viewport se ajusta a todos los marcadores;
        // vacío, se deja donde está para no desorientar.
        if mutated && !msg.results.is_empty() {
            let mut coords: Vec<Position> = msg
                .results
                .iter()
                .map(|r| r.summary.position())
                .collect();
            if let Some(position) = msg.position {
                coords.push(position);
            }
            self.surface.fit_bounds(&coords, FIT_BOUNDS_PADDING);
        }

        self.in_render = false;
    }
}

impl Actor for MapViewSynchronizer {
    type Context = Context<Self>;
}

impl Handler<SetSurfaceReady> for MapViewSynchronizer {
    type Result = ();

    fn handle(&mut self, _msg: SetSurfaceReady, _ctx: &mut Self::Context) {
        let center = self
            .pending
            .as_ref()
            .and_then(|p| p.position)
            .unwrap_or(Position::new(DEFAULT_MAP_CENTER.0, DEFAULT_MAP_CENTER.1));
        self.surface.init(center, DEFAULT_MAP_ZOOM);
        self.ready = true;
        self.logger.info("Map surface ready");
        if let Some(pending) = self.pending.take() {
            self.apply(pending);
        }
    }
}

impl Handler<RenderResults> for MapViewSynchronizer {
    type Result = ();

    fn handle(&mut self, msg: RenderResults, _ctx: &mut Self::Context) {
        if !self.ready {
            // La superficie sigue inicializándose: encolar, coalescer.
            self.pending = Some(msg);
            return;
        }
        if self.in_render {
            self.queued = Some(msg);
            return;
        }
        self.apply(msg);
        while let Some(queued) = self.queued.take() {
            self.apply(queued);
        }
    }
}
