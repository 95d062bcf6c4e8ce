use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use ninja_domain::config::Settings;
use ninja_domain::constants::{DOCS_PATH, HEALTHY, OPERATIONAL, SYSTEM_TAG};
use serde::Serialize;
use utoipa::ToSchema;

/// Welcome payload
#[derive(Debug, Serialize, ToSchema)]
pub struct WelcomeResponse {
    /// Greeting including the project name
    pub message: String,
    pub description: String,
    pub version: String,
    pub domain: String,
    /// Path of the interactive documentation
    pub docs: String,
    pub status: String,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests
    pub status: String,
    pub service: String,
    pub version: String,
    pub environment: String,
}

impl From<&Settings> for WelcomeResponse {
    fn from(settings: &Settings) -> Self {
        Self {
            message: settings.welcome_message(),
            description: settings.project_description.clone(),
            version: settings.version.clone(),
            domain: settings.domain.clone(),
            docs: DOCS_PATH.to_owned(),
            status: OPERATIONAL.to_owned(),
        }
    }
}

impl From<&Settings> for HealthResponse {
    fn from(settings: &Settings) -> Self {
        Self {
            status: HEALTHY.to_owned(),
            service: settings.service_name(),
            version: settings.version.clone(),
            environment: settings.environment.clone(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = OK, description = "Welcome message", body = WelcomeResponse)),
    tag = SYSTEM_TAG,
)]
pub async fn root_handler(State(settings): State<Settings>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse::from(&settings))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = OK, description = "Healthcheck endpoint", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub async fn health_handler(State(settings): State<Settings>) -> impl IntoResponse {
    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(HealthResponse::from(&settings)),
    )
}
