use crate::server::ApiError;
use axum::http::HeaderValue;
use ninja_domain::config::Settings;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::debug;

/// Builds the cross-origin policy.
///
/// Debug mode mirrors any request origin; otherwise only `https://{domain}` is
/// answered with an allow-origin header. Methods and headers are mirrored and
/// credentials are allowed in both modes.
///
/// # Errors
/// Returns [`ApiError::Validation`] if the configured domain cannot form an origin header.
pub fn cors_layer(settings: &Settings) -> Result<CorsLayer, ApiError> {
    let origin = if settings.debug {
        debug!("CORS: mirroring any origin");
        AllowOrigin::mirror_request()
    } else {
        let origin = settings.production_origin();
        let value = HeaderValue::from_str(&origin).map_err(|e| ApiError::Validation {
            message: format!("Invalid origin '{}': {e}", origin.escape_debug()).into(),
            context: Some("CORS".into()),
        })?;
        debug!(%origin, "CORS: single origin");
        AllowOrigin::list([value])
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
