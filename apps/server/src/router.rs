use axum::routing::get;
use axum::{Json, Router};
use ninja_kernel::domain::constants::{DOCS_PATH, OPENAPI_PATH, REDOC_PATH};
use ninja_kernel::server::cors::cors_layer;
use ninja_kernel::server::router::system_router;
use ninja_kernel::server::{ApiError, AppState};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_redoc::{Redoc, Servable as _};
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
struct ApiDoc;

pub(crate) fn init(state: AppState) -> Result<Router, ApiError> {
    let settings = state.settings.clone();

    let mut api = ApiDoc::openapi();
    api.info.title.clone_from(&settings.project_name);
    api.info.description = Some(settings.project_description.clone());
    api.info.version.clone_from(&settings.version);

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) =
        OpenApiRouter::with_openapi(api).merge(system_router()).with_state(state).split_for_parts();

    let document = api_doc.clone();
    let router = Router::new()
        .merge(openapi_routes)
        .merge(Scalar::with_url(DOCS_PATH, api_doc.clone()))
        .merge(Redoc::with_url(REDOC_PATH, api_doc))
        .route(OPENAPI_PATH, get(move || async move { Json(document) }))
        .layer(cors_layer(&settings)?)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
