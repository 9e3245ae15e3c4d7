use sea_orm_migration::prelude::*;

mod m20261001_000001_create_incidents;
mod m20261001_000002_create_volunteer_tasks;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_incidents::Migration),
            Box::new(m20261001_000002_create_volunteer_tasks::Migration),
        ]
    }
}
