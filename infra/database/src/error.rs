use ninja_domain::error::format_context;
use std::borrow::Cow;

/// A specialized [`DatabaseError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Validation errors.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when the connection options are rejected or the startup probe fails.
    #[error("Database connection failed{}: {source}", format_context(.context))]
    Connection { source: sqlx::Error, context: Option<Cow<'static, str>> },

    /// A session could not be handed out (pool exhausted, closed, or unreachable).
    #[error("Session acquisition failed{}: {source}", format_context(.context))]
    Acquire { source: sqlx::Error, context: Option<Cow<'static, str>> },

    /// A wrapper for errors raised by statements run on a session.
    #[error("SQL error{}: {source}", format_context(.context))]
    Sqlx { source: sqlx::Error, context: Option<Cow<'static, str>> },
}

ninja_domain::error_context!(DatabaseErrorExt, DatabaseError {
    sqlx::Error => Sqlx,
});

/// Replaces the context of an existing [`DatabaseError`].
impl<T> DatabaseErrorExt<T> for Result<T, DatabaseError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                DatabaseError::Validation { context: c, .. }
                | DatabaseError::Connection { context: c, .. }
                | DatabaseError::Acquire { context: c, .. }
                | DatabaseError::Sqlx { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(source: sqlx::Error) -> Self {
        Self::Sqlx { source, context: None }
    }
}
