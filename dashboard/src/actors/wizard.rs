use std::sync::Arc;
use std::time::Duration;

use actix::prelude::*;
use colored::Color;

use common::constants::{RECOMMENDATION_TOP_N, WIZARD_ADVANCE_MILLIS};
use common::logger::Logger;
use common::messages::{
    CloseWizard, OpenWizard, PositionUpdate, RecommendationsReady, RestartWizard, SelectOption,
    ShowRestaurantOnMap, StepBack, ViewOnMap,
};
use common::types::errors::WizardError;
use common::types::position::Position;
use common::types::restaurant::{ResultOrigin, ResultSet};

use crate::api::{Preferences, RecommendationBackend};
use crate::messages::{GetWizardStatus, WizardPhaseView, WizardStatus};

/// Pregunta del cuestionario de descubrimiento. `key` es la clave de
/// wire bajo la que viaja la respuesta al servicio de IA.
pub struct Question {
    pub key: &'static str,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
}

pub const QUESTIONS: [Question; 5] = [
    Question {
        key: "clima_actual",
        prompt: "¿Cómo está el clima hoy?",
        options: &["soleado", "lluvioso", "nublado", "caluroso", "frio"],
    },
    Question {
        key: "ocasion",
        prompt: "¿Cuál es la ocasión?",
        options: &["solo", "pareja", "amigos", "familia", "trabajo"],
    },
    Question {
        key: "distancia",
        prompt: "¿Qué tan lejos estás dispuesto a ir?",
        options: &["caminando", "cerca", "no_importa"],
    },
    Question {
        key: "antojo",
        prompt: "¿Qué se te antoja?",
        options: &["tacos", "pizza", "sushi", "hamburguesa", "saludable", "postre"],
    },
    Question {
        key: "presupuesto",
        prompt: "¿Cuál es tu presupuesto?",
        options: &["economico", "moderado", "especial"],
    },
];

#[derive(Clone, Copy)]
enum WizardPhase {
    Closed,
    Asking(usize),
    Submitting,
    Results,
    Failed(WizardError),
}

/// Actor `RecommendationWizard`: cuestionario guiado que junta
/// preferencias y las manda al servicio de recomendaciones. La máquina
/// de fases garantiza a lo sumo un envío por corrida del cuestionario;
/// la única salida de un fallo es `RestartWizard`.
pub struct RecommendationWizard {
    api: Arc<dyn RecommendationBackend>,
    dashboard: Recipient<RecommendationsReady>,
    map_events: Recipient<ShowRestaurantOnMap>,
    position: Option<Position>,
    position_seq: u64,
    phase: WizardPhase,
    answers: Preferences,
    results: Option<ResultSet>,
    advance: Option<SpawnHandle>,
    advance_delay: Duration,
    submissions: u32,
    logger: Logger,
}

impl RecommendationWizard {
    pub fn new(
        api: Arc<dyn RecommendationBackend>,
        dashboard: Recipient<RecommendationsReady>,
        map_events: Recipient<ShowRestaurantOnMap>,
    ) -> Self {
        Self {
            api,
            dashboard,
            map_events,
            position: None,
            position_seq: 0,
            phase: WizardPhase::Closed,
            answers: Preferences::new(),
            results: None,
            advance: None,
            advance_delay: Duration::from_millis(WIZARD_ADVANCE_MILLIS),
            submissions: 0,
            logger: Logger::new("Wizard", Color::Blue),
        }
    }

    /// Retardo de avance corto para tests.
    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    fn cancel_advance(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.advance.take() {
            ctx.cancel_future(handle);
        }
    }

    fn reset(&mut self, ctx: &mut Context<Self>) {
        self.cancel_advance(ctx);
        self.answers.clear();
        self.results = None;
    }

    fn submit(&mut self, ctx: &mut Context<Self>) {
        let Some(position) = self.position else {
            self.logger.warn("cannot recommend without a position");
            self.phase = WizardPhase::Failed(WizardError::MissingPosition);
            return;
        };

        self.phase = WizardPhase::Submitting;
        self.submissions += 1;
        let submission = self.submissions;
        let api = self.api.clone();
        let preferences = self.answers.clone();
        self.logger.info(format!(
            "submitting {} preferences to the discovery service",
            preferences.len()
        ));

        ctx.spawn(
            async move { api.discover(&preferences, position, RECOMMENDATION_TOP_N).await }
                .into_actor(self)
                .map(move |outcome, act, _ctx| {
                    // Un restart mientras el pedido volaba lo invalida.
                    if act.submissions != submission
                        || !matches!(act.phase, WizardPhase::Submitting)
                    {
                        return;
                    }
                    match outcome {
                        Ok(list) if list.is_empty() => {
                            act.phase = WizardPhase::Failed(WizardError::NoRecommendations);
                        }
                        Ok(list) => {
                            let results = ResultSet::new(ResultOrigin::Recommendation, list);
                            act.logger
                                .info(format!("{} recommendations received", results.len()));
                            act.results = Some(results.clone());
                            act.phase = WizardPhase::Results;
                            act.dashboard.do_send(RecommendationsReady { results });
                        }
                        Err(err) => {
                            act.logger.error(format!("discovery service failed: {}", err));
                            act.phase = WizardPhase::Failed(WizardError::Service);
                        }
                    }
                }),
        );
    }
}

impl Actor for RecommendationWizard {
    type Context = Context<Self>;
}

impl Handler<PositionUpdate> for RecommendationWizard {
    type Result = ();

    fn handle(&mut self, msg: PositionUpdate, _ctx: &mut Self::Context) {
        if msg.seq < self.position_seq {
            return;
        }
        self.position_seq = msg.seq;
        if let Ok(position) = msg.reading {
            self.position = Some(position);
        }
    }
}

impl Handler<OpenWizard> for RecommendationWizard {
    type Result = ();

    fn handle(&mut self, _msg: OpenWizard, ctx: &mut Self::Context) {
        self.reset(ctx);
        self.phase = WizardPhase::Asking(0);
        self.logger
            .info(format!("wizard opened: {}", QUESTIONS[0].prompt));
    }
}

impl Handler<SelectOption> for RecommendationWizard {
    type Result = ();

    fn handle(&mut self, msg: SelectOption, ctx: &mut Self::Context) {
        let WizardPhase::Asking(step) = self.phase else {
            return;
        };
        self.answers
            .insert(QUESTIONS[step].key.to_string(), msg.value);

        // Una segunda selección dentro del retardo reemplaza la primera
        // y reinicia el reloj: el avance es cosmético, no un commit.
        self.cancel_advance(ctx);
        let handle = ctx.run_later(self.advance_delay, move |act, ctx| {
            act.advance = None;
            if step + 1 < QUESTIONS.len() {
                act.phase = WizardPhase::Asking(step + 1);
                act.logger.info(QUESTIONS[step + 1].prompt);
            } else {
                act.submit(ctx);
            }
        });
        self.advance = Some(handle);
    }
}

impl Handler<StepBack> for RecommendationWizard {
    type Result = ();

    fn handle(&mut self, _msg: StepBack, ctx: &mut Self::Context) {
        if let WizardPhase::Asking(step) = self.phase {
            self.cancel_advance(ctx);
            if step > 0 {
                // La respuesta de la pregunta abandonada se conserva.
                self.phase = WizardPhase::Asking(step - 1);
            }
        }
    }
}

impl Handler<RestartWizard> for RecommendationWizard {
    type Result = ();

    fn handle(&mut self, _msg: RestartWizard, ctx: &mut Self::Context) {
        self.reset(ctx);
        self.phase = WizardPhase::Asking(0);
        self.logger.info("wizard restarted");
    }
}

impl Handler<CloseWizard> for RecommendationWizard {
    type Result = ();

    fn handle(&mut self, _msg: CloseWizard, ctx: &mut Self::Context) {
        self.reset(ctx);
        self.phase = WizardPhase::Closed;
    }
}

impl Handler<ViewOnMap> for RecommendationWizard {
    type Result = ();

    fn handle(&mut self, msg: ViewOnMap, ctx: &mut Self::Context) {
        let known = self
            .results
            .as_ref()
            .map(|r| r.contains(msg.id))
            .unwrap_or(false);
        if !known {
            return;
        }
        self.map_events.do_send(ShowRestaurantOnMap { id: msg.id });
        self.reset(ctx);
        self.phase = WizardPhase::Closed;
    }
}

impl Handler<GetWizardStatus> for RecommendationWizard {
    type Result = MessageResult<GetWizardStatus>;

    fn handle(&mut self, _msg: GetWizardStatus, _ctx: &mut Self::Context) -> Self::Result {
        let phase = match self.phase {
            WizardPhase::Closed => WizardPhaseView::Closed,
            WizardPhase::Asking(step) => WizardPhaseView::Asking(step),
            WizardPhase::Submitting => WizardPhaseView::Submitting,
            WizardPhase::Results => WizardPhaseView::Results,
            WizardPhase::Failed(_) => WizardPhaseView::Failed,
        };
        MessageResult(WizardStatus {
            phase,
            answers: self.answers.clone(),
            submissions: self.submissions,
            result_ids: self
                .results
                .as_ref()
                .map(|r| r.ids())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use common::types::errors::ApiError;
    use common::types::restaurant::{RestaurantId, RestaurantSummary, RestaurantWithDistance};

    use super::*;

    fn restaurant(id: RestaurantId) -> RestaurantWithDistance {
        RestaurantWithDistance {
            summary: RestaurantSummary {
                id,
                name: format!("Restaurante {}", id),
                categories: vec!["Tacos".to_string()],
                rating: 4.5,
                average_price: Some(180.0),
                latitud: 19.44,
                longitud: -99.14,
                is_open: true,
                hours_today: None,
                image: None,
            },
            distance_km: None,
            travel_time: None,
            is_favorite: false,
        }
    }

    struct CountingBackend {
        calls: Arc<Mutex<u32>>,
        results: Vec<RestaurantWithDistance>,
    }

    impl CountingBackend {
        fn new(results: Vec<RestaurantWithDistance>) -> (Arc<Self>, Arc<Mutex<u32>>) {
            let calls = Arc::new(Mutex::new(0));
            (
                Arc::new(Self {
                    calls: calls.clone(),
                    results,
                }),
                calls,
            )
        }
    }

    #[async_trait::async_trait]
    impl RecommendationBackend for CountingBackend {
        async fn discover(
            &self,
            _preferences: &Preferences,
            _position: Position,
            _top_n: u32,
        ) -> Result<Vec<RestaurantWithDistance>, ApiError> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.results.clone())
        }
    }

    #[derive(Default)]
    struct Sink {
        ready: Vec<ResultSet>,
        shown: Vec<RestaurantId>,
    }

    impl Actor for Sink {
        type Context = Context<Self>;
    }

    impl Handler<RecommendationsReady> for Sink {
        type Result = ();

        fn handle(&mut self, msg: RecommendationsReady, _ctx: &mut Self::Context) {
            self.ready.push(msg.results);
        }
    }

    impl Handler<ShowRestaurantOnMap> for Sink {
        type Result = ();

        fn handle(&mut self, msg: ShowRestaurantOnMap, _ctx: &mut Self::Context) {
            self.shown.push(msg.id);
        }
    }

    #[derive(Message)]
    #[rtype(result = "(usize, Vec<RestaurantId>)")]
    struct Drain;

    impl Handler<Drain> for Sink {
        type Result = MessageResult<Drain>;

        fn handle(&mut self, _msg: Drain, _ctx: &mut Self::Context) -> Self::Result {
            MessageResult((self.ready.len(), self.shown.clone()))
        }
    }

    fn cdmx() -> Position {
        Position::new(19.4326, -99.1332)
    }

    fn wizard(
        backend: Arc<dyn RecommendationBackend>,
    ) -> (Addr<RecommendationWizard>, Addr<Sink>) {
        let sink = Sink::default().start();
        let addr = RecommendationWizard::new(
            backend,
            sink.clone().recipient(),
            sink.clone().recipient(),
        )
        .with_advance_delay(Duration::from_millis(5))
        .start();
        (addr, sink)
    }

    async fn answer_all(addr: &Addr<RecommendationWizard>) {
        for question in &QUESTIONS {
            addr.send(SelectOption {
                value: question.options[0].to_string(),
            })
            .await
            .unwrap();
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }

    #[actix_rt::test]
    async fn full_questionnaire_submits_exactly_once() {
        let (backend, calls) = CountingBackend::new(vec![restaurant(1), restaurant(2)]);
        let (addr, sink) = wizard(backend);

        addr.send(PositionUpdate {
            seq: 1,
            reading: Ok(cdmx()),
        })
        .await
        .unwrap();
        addr.send(OpenWizard).await.unwrap();
        answer_all(&addr).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(*calls.lock().unwrap(), 1);
        let status = addr.send(GetWizardStatus).await.unwrap();
        assert_eq!(status.phase, WizardPhaseView::Results);
        assert_eq!(status.result_ids, vec![1, 2]);
        let (ready, _) = sink.send(Drain).await.unwrap();
        assert_eq!(ready, 1);
    }

    #[actix_rt::test]
    async fn rapid_reselection_keeps_only_the_last_answer() {
        let (backend, _) = CountingBackend::new(vec![restaurant(1)]);
        let (addr, _) = wizard(backend);

        addr.send(OpenWizard).await.unwrap();
        addr.send(SelectOption {
            value: "soleado".to_string(),
        })
        .await
        .unwrap();
        addr.send(SelectOption {
            value: "lluvioso".to_string(),
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;

        let status = addr.send(GetWizardStatus).await.unwrap();
        assert_eq!(status.answers.get("clima_actual").unwrap(), "lluvioso");
        assert_eq!(status.phase, WizardPhaseView::Asking(1));
    }

    #[actix_rt::test]
    async fn missing_position_fails_without_calling_the_service() {
        let (backend, calls) = CountingBackend::new(vec![restaurant(1)]);
        let (addr, _) = wizard(backend);

        addr.send(OpenWizard).await.unwrap();
        answer_all(&addr).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(*calls.lock().unwrap(), 0);
        let status = addr.send(GetWizardStatus).await.unwrap();
        assert_eq!(status.phase, WizardPhaseView::Failed);
    }

    #[actix_rt::test]
    async fn empty_recommendations_are_a_failure_not_a_result() {
        let (backend, _) = CountingBackend::new(Vec::new());
        let (addr, sink) = wizard(backend);

        addr.send(PositionUpdate {
            seq: 1,
            reading: Ok(cdmx()),
        })
        .await
        .unwrap();
        addr.send(OpenWizard).await.unwrap();
        answer_all(&addr).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        let status = addr.send(GetWizardStatus).await.unwrap();
        assert_eq!(status.phase, WizardPhaseView::Failed);
        let (ready, _) = sink.send(Drain).await.unwrap();
        assert_eq!(ready, 0);
    }

    #[actix_rt::test]
    async fn step_back_preserves_the_answer_already_given() {
        let (backend, _) = CountingBackend::new(vec![restaurant(1)]);
        let (addr, _) = wizard(backend);

        addr.send(OpenWizard).await.unwrap();
        addr.send(SelectOption {
            value: "soleado".to_string(),
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;
        addr.send(StepBack).await.unwrap();

        let status = addr.send(GetWizardStatus).await.unwrap();
        assert_eq!(status.phase, WizardPhaseView::Asking(0));
        assert_eq!(status.answers.get("clima_actual").unwrap(), "soleado");
    }

    #[actix_rt::test]
    async fn restart_wipes_answers_and_returns_to_the_first_question() {
        let (backend, _) = CountingBackend::new(vec![restaurant(1)]);
        let (addr, _) = wizard(backend);

        addr.send(OpenWizard).await.unwrap();
        addr.send(SelectOption {
            value: "soleado".to_string(),
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;
        addr.send(RestartWizard).await.unwrap();

        let status = addr.send(GetWizardStatus).await.unwrap();
        assert_eq!(status.phase, WizardPhaseView::Asking(0));
        assert!(status.answers.is_empty());
    }

    #[actix_rt::test]
    async fn view_on_map_emits_the_selection_and_closes_the_wizard() {
        let (backend, _) = CountingBackend::new(vec![restaurant(7)]);
        let (addr, sink) = wizard(backend);

        addr.send(PositionUpdate {
            seq: 1,
            reading: Ok(cdmx()),
        })
        .await
        .unwrap();
        addr.send(OpenWizard).await.unwrap();
        answer_all(&addr).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        addr.send(ViewOnMap { id: 7 }).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let status = addr.send(GetWizardStatus).await.unwrap();
        assert_eq!(status.phase, WizardPhaseView::Closed);
        let (_, shown) = sink.send(Drain).await.unwrap();
        assert_eq!(shown, vec![7]);
    }
}
