use config::{Config, Environment, Map};
use ninja_domain::config::{Settings, SettingsInner};
use ninja_domain::error::format_context;
use std::borrow::Cow;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment file consulted by [`SettingsLoader::new`].
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Custom error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Environment file error{}: {source}", format_context(.context))]
    EnvFile { source: dotenvy::Error, context: Option<Cow<'static, str>> },

    #[error("Environment error{}: {message}", format_context(.context))]
    Environment { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

ninja_domain::error_context!(ConfigErrorExt, ConfigError {
    config::ConfigError => Config,
    dotenvy::Error => EnvFile,
});

/// Builds the process [`Settings`] from layered sources.
///
/// Layers, lowest priority first:
/// 1. **Defaults**: compiled into [`SettingsInner::default`].
/// 2. **Environment file**: `KEY=value` lines from `.env` (optional, a missing file is skipped).
/// 3. **Environment**: process variables named after the keys, matched case-insensitively
///    (e.g., `DATABASE_URL` or `database_url` map to `database_url`).
///
/// Only the keys listed in [`SettingsInner::KEYS`] are read from either source;
/// unrelated variables are never inspected.
///
/// Only type coercion is performed: `ACCESS_TOKEN_EXPIRE_MINUTES=soon` or `DEBUG=maybe`
/// fail with an error naming the key.
#[derive(Debug, Clone)]
#[must_use = "loaders do nothing unless you call .load()"]
pub struct SettingsLoader {
    env_file: Option<PathBuf>,
    environment: Option<Map<String, String>>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self { env_file: Some(PathBuf::from(DEFAULT_ENV_FILE)), environment: None }
    }
}

impl SettingsLoader {
    /// Loader reading the process environment and `.env` from the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from `path` instead of `.env`.
    pub fn env_file(mut self, path: impl AsRef<Path>) -> Self {
        self.env_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Skips the environment file entirely.
    pub fn without_env_file(mut self) -> Self {
        self.env_file = None;
        self
    }

    /// The environment file [`load`](Self::load) will read, if it exists.
    #[must_use]
    pub fn env_file_in_use(&self) -> Option<&Path> {
        self.env_file.as_deref().filter(|path| path.is_file())
    }

    /// Uses `vars` in place of the process environment.
    pub fn environment<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Resolves every layer into a [`Settings`] handle.
    ///
    /// # Errors
    /// * [`ConfigError::EnvFile`] if the environment file exists but cannot be parsed.
    /// * [`ConfigError::Environment`] if a settings variable holds non-Unicode data.
    /// * [`ConfigError::Config`] if a value cannot be coerced into its field type.
    pub fn load(self) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = &self.env_file {
            if let Some(values) = read_env_file(path)? {
                info!(path = %path.display(), keys = values.len(), "Loading environment file");
                builder = builder.add_source(Environment::default().source(Some(values)));
            } else {
                debug!(path = %path.display(), "No environment file, skipping");
            }
        }

        let variables = match self.environment {
            Some(vars) => vars.into_iter().filter(|(key, _)| SettingsInner::is_key(key)).collect(),
            None => settings_variables(std::env::vars_os())?,
        };
        builder = builder.add_source(Environment::default().source(Some(variables)));

        let inner = builder
            .build()
            .context("Failed to build settings")?
            .try_deserialize::<SettingsInner>()
            .context("Failed to deserialize settings")?;

        Ok(Settings::from(inner))
    }
}

/// Loads settings from the process environment and `.env`.
///
/// # Errors
/// See [`SettingsLoader::load`].
pub fn load_settings() -> Result<Settings, ConfigError> {
    SettingsLoader::new().load()
}

fn read_env_file(path: &Path) -> Result<Option<Map<String, String>>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }

    let context = || format!("Reading {}", path.display());
    let values = dotenvy::from_path_iter(path)
        .context(context())?
        .filter(|item| item.as_ref().map_or(true, |(key, _)| SettingsInner::is_key(key)))
        .collect::<Result<Map<_, _>, _>>()
        .context(context())?;

    Ok(Some(values))
}

/// Picks the settings keys out of raw process variables.
///
/// Unrelated variables are skipped without looking at their values, so a
/// non-Unicode value only fails when it belongs to a setting.
fn settings_variables<I>(vars: I) -> Result<Map<String, String>, ConfigError>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut variables = Map::new();
    for (key, value) in vars {
        let Some(key) = key.to_str().filter(|key| SettingsInner::is_key(key)) else {
            continue;
        };
        let value = value.into_string().map_err(|_| ConfigError::Environment {
            message: format!("{key} contains non-Unicode data").into(),
            context: None,
        })?;
        variables.insert(key.to_ascii_lowercase(), value);
    }
    Ok(variables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrelated_variables_are_skipped() {
        let vars = [
            (OsString::from("PATH"), OsString::from("/usr/bin")),
            (OsString::from("Project_Name"), OsString::from("Kunai")),
            (OsString::from("PORT"), OsString::from("9000")),
        ];

        let variables = settings_variables(vars).expect("filtered");
        assert_eq!(variables.len(), 2);
        assert_eq!(variables["project_name"], "Kunai");
        assert_eq!(variables["port"], "9000");
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_values_only_fail_for_settings() {
        use std::os::unix::ffi::OsStringExt;

        let garbage = || OsString::from_vec(vec![0xff, 0xfe]);

        let ignored = settings_variables([(OsString::from("UNRELATED_TOOL_VAR"), garbage())]);
        assert!(ignored.expect("unrelated garbage is ignored").is_empty());

        let err = settings_variables([(OsString::from("SECRET_KEY"), garbage())]).unwrap_err();
        assert!(matches!(err, ConfigError::Environment { .. }));
        assert!(err.to_string().contains("SECRET_KEY"));
    }
}
