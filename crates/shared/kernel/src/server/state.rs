use crate::server::ApiError;
use axum::extract::FromRef;
use ninja_database::Database;
use ninja_domain::config::Settings;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug)]
pub struct AppStateInner {
    pub settings: Settings,
    pub database: Database,
}

/// Shared application state. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(state: &AppState) -> Self {
        state.inner.settings.clone()
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.inner.database.clone()
    }
}

#[derive(Debug, Default)]
#[must_use = "builders do nothing unless you call .build()"]
pub struct AppStateBuilder {
    settings: Option<Settings>,
    database: Option<Database>,
}

impl AppStateBuilder {
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Finalizes the state.
    ///
    /// # Errors
    /// Returns [`ApiError::Validation`] if the settings or the database were not provided.
    pub fn build(self) -> Result<AppState, ApiError> {
        let settings = self.settings.ok_or_else(|| ApiError::Validation {
            message: "Settings not provided".into(),
            context: Some("AppState".into()),
        })?;
        let database = self.database.ok_or_else(|| ApiError::Validation {
            message: "Database not provided".into(),
            context: Some("AppState".into()),
        })?;

        Ok(AppState { inner: Arc::new(AppStateInner { settings, database }) })
    }
}
