use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use crate::{
    dto::{ErrorResponse, GenerationRequest},
    service::ReplyService,
};

pub struct AppState {
    pub service: ReplyService,
    /// When set, failures are answered with 502 and a JSON error instead of 200 text
    pub strict_errors: bool,
}

#[derive(OpenApi)]
#[openapi(
    paths(health_check, generate_reply),
    components(schemas(GenerationRequest, ErrorResponse)),
    tags(
        (name = "email", description = "Email reply generation API")
    )
)]
pub struct ApiDoc;

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/api/email/generate", post(generate_reply))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain")
    ),
    tag = "email"
)]
#[debug_handler]
pub async fn health_check() -> Response {
    (StatusCode::OK, "Hello from email writer!").into_response()
}

#[utoipa::path(
    post,
    path = "/api/email/generate",
    request_body = GenerationRequest,
    responses(
        (status = 200, description = "Generated reply, or the failure message when strict errors are off", body = String, content_type = "text/plain"),
        (status = 400, description = "Email content is blank", body = ErrorResponse),
        (status = 502, description = "Generative API call or response parsing failed", body = ErrorResponse)
    ),
    tag = "email"
)]
#[debug_handler]
pub async fn generate_reply(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerationRequest>,
) -> Response {
    if payload.email_content.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "emailContent must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    if !state.strict_errors {
        return (StatusCode::OK, state.service.generate(&payload).await).into_response();
    }

    match state.service.try_generate(&payload).await {
        Ok(reply) => (StatusCode::OK, reply).into_response(),
        Err(e) => {
            tracing::error!("failed to generate email reply: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
