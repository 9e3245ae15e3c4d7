use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key to incidents: deleting an incident leaves its tasks alone.
        manager
            .create_table(
                Table::create()
                    .table(VolunteerTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VolunteerTasks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VolunteerTasks::VolunteerId).integer())
                    .col(ColumnDef::new(VolunteerTasks::IncidentId).integer())
                    .col(ColumnDef::new(VolunteerTasks::TaskName).string())
                    .col(
                        ColumnDef::new(VolunteerTasks::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_volunteer_tasks_volunteer_id")
                    .table(VolunteerTasks::Table)
                    .col(VolunteerTasks::VolunteerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_volunteer_tasks_incident_id")
                    .table(VolunteerTasks::Table)
                    .col(VolunteerTasks::IncidentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VolunteerTasks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VolunteerTasks {
    Table,
    Id,
    VolunteerId,
    IncidentId,
    TaskName,
    Status,
}
