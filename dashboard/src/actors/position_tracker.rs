use std::sync::Arc;
use std::time::Duration;

use actix::fut::wrap_future;
use actix::prelude::*;
use colored::Color;

use common::constants::WATCH_INTERVAL_MILLIS;
use common::logger::Logger;
use common::messages::{
    PositionUpdate, RefreshOnce, StartTracking, StopTracking, SubscribePosition,
};
use common::types::errors::GeoError;

use crate::geo::{GeoOptions, Geolocator};
use crate::messages::internal_messages::{GetTrackerStatus, TrackerStatus};

/// Actor `PositionTracker`: envuelve la capacidad de geolocalización del
/// dispositivo y emite un stream de lecturas numeradas a sus
/// suscriptores.
///
/// ## Responsabilidades
/// - Pedir lecturas únicas o periódicas al `Geolocator`.
/// - Clasificar cada falla en exactamente una de las tres clases de
///   `GeoError` (la clasificación la hace el `Geolocator`).
/// - Emitir a los suscriptores; nunca dispara búsquedas por su cuenta.
///
/// Un permiso denegado detiene el modo continuo: queda en manos del
/// usuario reintentar con `RefreshOnce`.
pub struct PositionTracker {
    geolocator: Arc<dyn Geolocator>,
    options: GeoOptions,
    subscribers: Vec<Recipient<PositionUpdate>>,
    watch_handle: Option<SpawnHandle>,
    watch_interval: Duration,
    seq: u64,
    logger: Logger,
}

impl PositionTracker {
    pub fn new(geolocator: Arc<dyn Geolocator>) -> Self {
        Self {
            geolocator,
            options: GeoOptions::default(),
            subscribers: Vec::new(),
            watch_handle: None,
            watch_interval: Duration::from_millis(WATCH_INTERVAL_MILLIS),
            seq: 0,
            logger: Logger::new("Position Tracker", Color::Blue),
        }
    }

    /// Intervalo de sondeo configurable, para tests.
    pub fn with_watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }

    fn halt_watch(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.watch_handle.take() {
            ctx.cancel_future(handle);
        }
    }

    /// Lanza una lectura. La resolución vuelve al mailbox; si mientras
    /// tanto se emitió una lectura más nueva, esta se descarta
    /// (last-issued-wins).
    fn read(&mut self, ctx: &mut Context<Self>) {
        self.seq += 1;
        let seq = self.seq;
        let geolocator = self.geolocator.clone();
        let options = self.options;

        let fut = wrap_future::<_, Self>(async move { geolocator.locate(&options).await }).map(
            move |reading, act, ctx| {
                if seq != act.seq {
                    act.logger
                        .warn(format!("Discarding stale position reading (seq {})", seq));
                    return;
                }
                if let Err(GeoError::PermissionDenied) = reading {
                    act.logger.error(GeoError::PermissionDenied.to_string());
                    act.halt_watch(ctx);
                }
                for subscriber in &act.subscribers {
                    subscriber.do_send(PositionUpdate {
                        seq,
                        reading: reading.clone(),
                    });
                }
            },
        );
        ctx.spawn(fut);
    }
}

impl Actor for PositionTracker {
    type Context = Context<Self>;

    /// Al desmontar se corta el seguimiento para no filtrar callbacks.
    fn stopped(&mut self, ctx: &mut Self::Context) {
        self.halt_watch(ctx);
    }
}

impl Handler<SubscribePosition> for PositionTracker {
    type Result = ();

    fn handle(&mut self, msg: SubscribePosition, _ctx: &mut Self::Context) {
        self.subscribers.push(msg.recipient);
    }
}

impl Handler<StartTracking> for PositionTracker {
    type Result = ();

    fn handle(&mut self, msg: StartTracking, ctx: &mut Self::Context) {
        self.read(ctx);
        if msg.continuous && self.watch_handle.is_none() {
            self.logger.info("Starting continuous tracking");
            let handle = ctx.run_interval(self.watch_interval, |act, ctx| {
                act.read(ctx);
            });
            self.watch_handle = Some(handle);
        }
    }
}

impl Handler<RefreshOnce> for PositionTracker {
    type Result = ();

    fn handle(&mut self, _msg: RefreshOnce, ctx: &mut Self::Context) {
        self.logger.info("Refreshing position on demand");
        self.read(ctx);
    }
}

impl Handler<StopTracking> for PositionTracker {
    type Result = ();

    fn handle(&mut self, _msg: StopTracking, ctx: &mut Self::Context) {
        self.logger.info("Stopping continuous tracking");
        self.halt_watch(ctx);
    }
}

impl Handler<GetTrackerStatus> for PositionTracker {
    type Result = MessageResult<GetTrackerStatus>;

    fn handle(&mut self, _msg: GetTrackerStatus, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(TrackerStatus {
            seq: self.seq,
            watching: self.watch_handle.is_some(),
        })
    }
}
