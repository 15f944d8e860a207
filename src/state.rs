use std::sync::Arc;

use crate::config::Config;
use crate::events::EventBus;
use crate::services::QuizService;
use crate::store::PgQuizStore;
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub quiz: QuizService,
    pub events: EventBus,
}

impl AppState {
    /// Production wiring: quiz flow on Postgres, events on a broadcast bus.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let events = EventBus::new(config.event_channel_capacity);
        let quiz = QuizService::new(
            Arc::new(PgQuizStore::new(pool.clone())),
            Arc::new(events.clone()),
        );

        Self {
            pool,
            config,
            quiz,
            events,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for QuizService {
    fn from_ref(state: &AppState) -> Self {
        state.quiz.clone()
    }
}

impl FromRef<AppState> for EventBus {
    fn from_ref(state: &AppState) -> Self {
        state.events.clone()
    }
}
