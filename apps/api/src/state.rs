use crate::screening::questions::QuestionService;
use crate::screening::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Live conversations, keyed by session id.
    pub sessions: SessionStore,
    /// Question backend plus its bounded wait. Default: hosted LLM.
    pub questions: QuestionService,
}
