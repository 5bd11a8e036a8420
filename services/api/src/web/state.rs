//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::auth::TokenVerifier;
use std::sync::Arc;
use summary_core::ports::{DatabaseService, SummaryPipelineService};
use summary_core::view::ReloadPolicy;
use summary_core::DocumentService;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: DocumentService,
    pub verifier: TokenVerifier,
    pub reload: ReloadPolicy,
}

impl AppState {
    pub fn new(
        config: &Config,
        db: Arc<dyn DatabaseService>,
        pipeline: Arc<dyn SummaryPipelineService>,
    ) -> Self {
        Self {
            service: DocumentService::new(db, pipeline),
            verifier: TokenVerifier::new(&config.jwt_secret),
            reload: ReloadPolicy {
                delay: config.regeneration_reload_delay,
            },
        }
    }
}
