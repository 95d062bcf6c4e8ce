use ninja_database::sqlx::{Sqlite, query_scalar};
use ninja_database::*;
use ninja_domain::config::Settings;
use std::future::pending;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{sleep, timeout};

fn memory_db(max_connections: u32) -> Database<Sqlite> {
    DatabaseBuilder::<Sqlite>::new()
        .url("sqlite::memory:")
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy()
        .expect("lazy sqlite pool")
}

/// Connections travel back to the idle set on a background task.
async fn wait_until_idle(db: &Database<Sqlite>) {
    timeout(Duration::from_secs(2), async {
        loop {
            let status = db.status();
            if status.idle == status.size as usize {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("connection should return to the pool");
}

#[tokio::test]
async fn missing_url_fails_validation() {
    let err = DatabaseBuilder::<Sqlite>::new().connect_lazy().unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn zero_sized_pool_fails_validation() {
    let err = DatabaseBuilder::<Sqlite>::new()
        .url("sqlite::memory:")
        .max_connections(0)
        .connect_lazy()
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn malformed_postgres_url_is_rejected() {
    let err = Database::builder().url("definitely not a url").connect_lazy().unwrap_err();
    assert!(matches!(err, DatabaseError::Connection { .. }));
    assert!(err.to_string().contains("Parsing connection URL"));
}

#[tokio::test]
async fn settings_drive_the_builder() {
    let mut settings = Settings::default();
    settings.database_url = "sqlite::memory:".to_owned();
    settings.database_acquire_timeout_seconds = 1;

    let db =
        DatabaseBuilder::<Sqlite>::new().with_settings(&settings).connect_lazy().expect("pool");
    db.ping().await.expect("ping");

    settings.database_max_connections = 0;
    let err =
        DatabaseBuilder::<Sqlite>::new().with_settings(&settings).connect_lazy().unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[test]
fn building_outside_a_runtime_is_an_error() {
    let err = DatabaseBuilder::<Sqlite>::new().url("sqlite::memory:").connect_lazy().unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
    assert!(err.to_string().contains("Tokio runtime"));
}

#[tokio::test]
async fn lazy_pool_opens_nothing_until_first_acquire() {
    let db = memory_db(2);
    assert_eq!(db.status(), PoolStatus { size: 0, idle: 0, leased: 0 });
}

#[tokio::test]
async fn connect_verifies_liveness() {
    let db = DatabaseBuilder::<Sqlite>::new()
        .url("sqlite::memory:")
        .max_connections(1)
        .connect()
        .await
        .expect("sqlite connect");

    wait_until_idle(&db).await;
    assert_eq!(db.status().leased, 0);
    db.ping().await.expect("ping");
}

#[tokio::test]
async fn explicit_release_returns_connection_once() {
    let db = memory_db(2);

    let session = db.acquire().await.expect("acquire");
    let status = db.status();
    assert_eq!(status.leased, 1);
    assert_eq!(status.size, 1);
    assert_eq!(status.idle, 0);

    session.release();
    assert_eq!(db.status().leased, 0);
    wait_until_idle(&db).await;
    assert_eq!(db.status().size, 1);
}

#[tokio::test]
async fn concurrent_sessions_are_counted_independently() {
    let db = memory_db(2);

    let first = db.acquire().await.expect("first");
    let second = db.acquire().await.expect("second");
    assert_eq!(db.status().leased, 2);

    drop(first);
    assert_eq!(db.status().leased, 1);
    second.release();
    assert_eq!(db.status().leased, 0);

    wait_until_idle(&db).await;
    assert_eq!(db.status().size, 2);
}

#[tokio::test]
async fn scoped_success_returns_value_and_releases() {
    let db = memory_db(1);

    let value = db
        .scoped(async |session: &mut Session<Sqlite>| {
            assert_eq!(db.status().leased, 1);
            let one: i64 = query_scalar("SELECT 1").fetch_one(&mut **session).await?;
            Ok::<_, DatabaseError>(one)
        })
        .await
        .expect("scoped query");

    assert_eq!(value, 1);
    assert_eq!(db.status().leased, 0);
    wait_until_idle(&db).await;
}

#[tokio::test]
async fn scoped_error_still_releases() {
    let db = memory_db(1);

    let err = db
        .scoped(async |session: &mut Session<Sqlite>| {
            query_scalar::<_, i64>("SELECT definitely_missing_column")
                .fetch_one(&mut **session)
                .await
                .context("Broken query")
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DatabaseError::Sqlx { .. }));
    assert!(err.to_string().contains("Broken query"));
    assert_eq!(db.status().leased, 0);
    wait_until_idle(&db).await;

    // the single connection is usable again
    db.ping().await.expect("ping after failed scope");
}

#[tokio::test]
async fn cancelled_scope_releases() {
    let db = memory_db(1);

    let outcome = timeout(
        Duration::from_millis(50),
        db.scoped(async |_session: &mut Session<Sqlite>| {
            pending::<()>().await;
            Ok::<_, DatabaseError>(())
        }),
    )
    .await;

    assert!(outcome.is_err(), "scope should have been cancelled by the timeout");
    assert_eq!(db.status().leased, 0);
    wait_until_idle(&db).await;
}

#[tokio::test]
async fn aborted_task_releases_its_session() {
    let db = memory_db(1);
    let (acquired_tx, acquired_rx) = oneshot::channel();

    let task_db = db.clone();
    let task = tokio::spawn(async move {
        let _session = task_db.acquire().await.expect("acquire in task");
        let _ = acquired_tx.send(());
        pending::<()>().await;
    });

    acquired_rx.await.expect("task acquired a session");
    assert_eq!(db.status().leased, 1);

    task.abort();
    let joined = task.await;
    assert!(joined.is_err_and(|e| e.is_cancelled()));

    assert_eq!(db.status().leased, 0);
    wait_until_idle(&db).await;
    db.ping().await.expect("connection reusable after abort");
}

#[tokio::test]
async fn exhausted_pool_times_out_without_leaking() {
    let db = memory_db(1);
    let held = db.acquire().await.expect("acquire");

    let err = db.acquire().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Acquire { .. }));
    assert_eq!(db.status().leased, 1);

    held.release();
    assert_eq!(db.status().leased, 0);
}

#[tokio::test]
async fn closed_pool_rejects_acquisition() {
    let db = memory_db(1);
    db.close().await;
    assert!(db.is_closed());

    let err = db
        .scoped(async |_session: &mut Session<Sqlite>| Ok::<_, DatabaseError>(()))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Acquire { .. }));
    assert_eq!(db.status().leased, 0);
}
