//! HTTP platform layer shared by the applications.
//!
//! * [`state::AppState`]: settings and database handle extracted by handlers.
//! * [`cors::cors_layer`]: cross-origin policy derived from the settings.
//! * [`router::system_router`]: the welcome and health endpoints.
//! * [`session::DbSession`]: one pooled session per request.

pub mod cors;
pub mod error;
pub mod router;
pub mod session;
pub mod state;
pub mod system;

pub use error::{ApiError, ApiErrorExt};
pub use session::DbSession;
pub use state::{AppState, AppStateBuilder};
