use crate::server::{ApiError, ApiErrorExt};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use ninja_database::{Database, Postgres, Session, sqlx};
use std::ops::{Deref, DerefMut};

/// Extracts one pooled [`Session`] for the duration of a request.
///
/// The session is released when the handler finishes, including when the
/// client disconnects and the request future is dropped. Failing to acquire
/// rejects the request with `500` and a `{"detail": ...}` body.
///
/// ```rust,ignore
/// async fn handler(DbSession(mut session): DbSession) -> Result<Json<i32>, ApiError> {
///     let (one,): (i32,) = sqlx::query_as("SELECT 1")
///         .fetch_one(&mut *session)
///         .await
///         .map_err(DatabaseError::from)?;
///     Ok(Json(one))
/// }
/// ```
#[derive(Debug)]
pub struct DbSession<DB: sqlx::Database = Postgres>(pub Session<DB>);

impl<S, DB> FromRequestParts<S> for DbSession<DB>
where
    S: Send + Sync,
    DB: sqlx::Database,
    Database<DB>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let database = Database::<DB>::from_ref(state);
        let session = database.acquire().await.context("Request session")?;
        Ok(Self(session))
    }
}

impl<DB: sqlx::Database> Deref for DbSession<DB> {
    type Target = Session<DB>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<DB: sqlx::Database> DerefMut for DbSession<DB> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
