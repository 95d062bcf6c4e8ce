use super::system;
use axum::extract::FromRef;
use ninja_domain::config::Settings;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Routes every application exposes: `/` and `/health`.
pub fn system_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
    Settings: FromRef<S>,
{
    OpenApiRouter::<S>::new()
        .routes(routes!(system::root_handler))
        .routes(routes!(system::health_handler))
}
