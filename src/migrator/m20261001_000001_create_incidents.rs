use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Incidents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Incidents::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Incidents::Title).string().not_null())
                    .col(ColumnDef::new(Incidents::Description).text())
                    .col(ColumnDef::new(Incidents::Latitude).double().not_null())
                    .col(ColumnDef::new(Incidents::Longitude).double().not_null())
                    .col(ColumnDef::new(Incidents::Severity).string())
                    .col(ColumnDef::new(Incidents::ImagePath).string())
                    .col(
                        ColumnDef::new(Incidents::Status)
                            .string_len(20)
                            .not_null()
                            .default("REPORTED"),
                    )
                    .col(ColumnDef::new(Incidents::ReportedAt).date_time().not_null())
                    .col(ColumnDef::new(Incidents::ReporterId).integer())
                    .col(ColumnDef::new(Incidents::AssignedOfficerId).integer())
                    .col(ColumnDef::new(Incidents::AssignedVolunteerId).integer())
                    .col(ColumnDef::new(Incidents::AssignmentNote).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_incidents_status")
                    .table(Incidents::Table)
                    .col(Incidents::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Incidents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Incidents {
    Table,
    Id,
    Title,
    Description,
    Latitude,
    Longitude,
    Severity,
    ImagePath,
    Status,
    ReportedAt,
    ReporterId,
    AssignedOfficerId,
    AssignedVolunteerId,
    AssignmentNote,
}
