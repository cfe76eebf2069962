use crate::{
    config::Config,
    handlers::*,
    services::{
        Clock, EventProcessor, HttpVerifier, MemoryStore, RecordStore, RedisStore, SystemClock,
        Verifier,
    },
};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn Verifier>,
    pub processor: Arc<EventProcessor>,
    pub store: Arc<dyn RecordStore>,
    pub clock: Arc<dyn Clock>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        verifier: Arc<dyn Verifier>,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let processor = Arc::new(EventProcessor::new(store.clone(), clock.clone()));
        Self {
            verifier,
            processor,
            store,
            clock,
            started_at: Instant::now(),
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn RecordStore> = if config.uses_memory_store() {
            tracing::warn!("Using in-memory record store; payments are lost on restart");
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(RedisStore::connect(&config.store_url).await?)
        };

        let verifier = Arc::new(HttpVerifier::new(
            config.validation_url.clone(),
            config.validation_timeout,
        )?);

        Ok(Self::new(verifier, store, Arc::new(SystemClock)))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/callback", post(payment_callback))
        .route("/sample", get(sample_badge))
        .route("/:recipient", get(recipient_badge))
        .with_state(state)
}
