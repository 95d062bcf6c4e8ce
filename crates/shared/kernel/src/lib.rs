//! Kernel utilities shared by the applications.
//! Keep this crate lightweight: settings loading is always available, the HTTP
//! platform layer (state, CORS, system routes, per-request sessions) sits behind
//! the `server` feature.
//!
//! ## Settings loading
//! ```rust,no_run
//! use ninja_kernel::config::SettingsLoader;
//!
//! let settings = SettingsLoader::new().env_file(".env").load().unwrap();
//! println!("{} v{}", settings.project_name, settings.version);
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use ninja_domain as domain;
