pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening conversation
        .route("/api/v1/sessions", post(handlers::handle_start_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_end_session),
        )
        .route(
            "/api/v1/sessions/:id/messages",
            post(handlers::handle_message),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::screening::questions::testing::{service, ScriptedGenerator};
    use crate::screening::store::SessionStore;

    fn test_state(generator: ScriptedGenerator) -> AppState {
        AppState {
            sessions: SessionStore::new(),
            questions: service(generator),
        }
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn start(app: &Router) -> String {
        let response = send(app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        body["session_id"].as_str().unwrap().to_string()
    }

    async fn say(app: &Router, id: &str, text: &str) -> Value {
        let uri = format!("/api/v1/sessions/{id}/messages");
        let response = send(app, Method::POST, &uri, Some(json!({ "text": text }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(ScriptedGenerator::new()));
        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_start_returns_greeting_and_progress() {
        let app = build_router(test_state(ScriptedGenerator::new()));
        let response = send(&app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["reply"]["kind"], "prompt");
        assert_eq!(body["progress"]["stage"], "COLLECTING_NAME");
        assert_eq!(body["progress"]["answered"], 0);
    }

    #[tokio::test]
    async fn test_full_conversation_over_http() {
        let app = build_router(test_state(ScriptedGenerator::new().failing_for("Docker")));
        let id = start(&app).await;

        for text in [
            "Alice",
            "alice@example.com",
            "+1234567890",
            "3",
            "Backend Engineer",
        ] {
            assert_eq!(say(&app, &id, text).await["reply"]["kind"], "prompt");
        }

        let first = say(&app, &id, "I know Python and Docker").await;
        assert_eq!(first["reply"]["kind"], "question");
        assert_eq!(first["progress"]["stage"], "ASKING");
        assert_eq!(first["progress"]["total"], 2);

        let second = say(&app, &id, "Answer one").await;
        assert_eq!(second["progress"]["answered"], 1);

        let done = say(&app, &id, "Answer two").await;
        assert_eq!(done["reply"]["kind"], "closing");
        assert_eq!(done["progress"]["stage"], "CONCLUDED");

        let snapshot = json_body(
            send(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await,
        )
        .await;
        assert_eq!(snapshot["tech_stack"], json!(["Python", "Docker"]));
        assert_eq!(snapshot["questions"][1]["source"], "fallback");
        assert_eq!(snapshot["answers"].as_array().unwrap().len(), 2);
        assert_eq!(snapshot["profile"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn test_validation_error_reply_keeps_stage() {
        let app = build_router(test_state(ScriptedGenerator::new()));
        let id = start(&app).await;
        say(&app, &id, "Alice").await;

        let body = say(&app, &id, "not-an-email").await;
        assert_eq!(body["reply"]["kind"], "validation_error");
        assert_eq!(body["progress"]["stage"], "COLLECTING_EMAIL");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let app = build_router(test_state(ScriptedGenerator::new()));
        let uri = format!("/api/v1/sessions/{}/messages", Uuid::new_v4());
        let response = send(&app, Method::POST, &uri, Some(json!({ "text": "hi" }))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_oversized_message_is_rejected() {
        let app = build_router(test_state(ScriptedGenerator::new()));
        let id = start(&app).await;
        let uri = format!("/api/v1/sessions/{id}/messages");
        let text = "a".repeat(handlers::MAX_MESSAGE_CHARS + 1);

        let response = send(&app, Method::POST, &uri, Some(json!({ "text": text }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_delete_ends_session() {
        let app = build_router(test_state(ScriptedGenerator::new()));
        let id = start(&app).await;
        let uri = format!("/api/v1/sessions/{id}");

        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_state() {
        let app = build_router(test_state(ScriptedGenerator::new()));
        let a = start(&app).await;
        let b = start(&app).await;

        say(&app, &a, "Alice").await;
        let body = say(&app, &b, "bye").await;
        assert_eq!(body["progress"]["stage"], "CONCLUDED");

        let body = say(&app, &a, "alice@example.com").await;
        assert_eq!(body["progress"]["stage"], "COLLECTING_PHONE");
    }
}
