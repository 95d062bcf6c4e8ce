//! Well-known names shared by the server and its documentation.

/// `OpenAPI` tag for platform endpoints (welcome, health).
pub const SYSTEM_TAG: &str = "System";

/// Interactive API documentation (Scalar).
pub const DOCS_PATH: &str = "/docs";
/// Alternative API reference (`ReDoc`).
pub const REDOC_PATH: &str = "/redoc";
/// Raw `OpenAPI` document.
pub const OPENAPI_PATH: &str = "/openapi.json";

pub const HEALTHY: &str = "healthy";
pub const WELCOME_PREFIX: &str = "🥷 Bienvenido a";
pub const OPERATIONAL: &str = "🟢 Sistema operativo";
