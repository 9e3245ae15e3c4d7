use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::migrator::Migrator;

/// Connects to the database and brings the schema up to date.
pub async fn connect_and_migrate(
    options: impl Into<ConnectOptions>,
) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}
