use sea_orm::{ConnectOptions, DatabaseConnection};
use std::sync::Arc;
use tempfile::TempDir;

use crate::db::connect_and_migrate;
use crate::storage::LocalAttachmentStore;

/// Migrated SQLite database and upload root inside one temporary directory.
pub(crate) struct TestContext {
    pub db: DatabaseConnection,
    pub attachments: Arc<LocalAttachmentStore>,
    _dir: TempDir,
}

pub(crate) async fn setup() -> TestContext {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crisis.db");

    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", db_path.display()));
    options.max_connections(1).sqlx_logging(false);
    let db = connect_and_migrate(options).await.unwrap();

    let attachments = LocalAttachmentStore::open(dir.path().join("uploads"))
        .await
        .unwrap();

    TestContext {
        db,
        attachments: Arc::new(attachments),
        _dir: dir,
    }
}
