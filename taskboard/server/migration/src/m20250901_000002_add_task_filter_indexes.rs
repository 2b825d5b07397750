use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_STATUS: &str = "idx_tasks_status";
const IDX_PRIORITY: &str = "idx_tasks_priority";
const IDX_CREATED_AT: &str = "idx_tasks_created_at";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, column) in [
            (IDX_STATUS, Tasks::Status),
            (IDX_PRIORITY, Tasks::Priority),
            (IDX_CREATED_AT, Tasks::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Tasks::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [IDX_STATUS, IDX_PRIORITY, IDX_CREATED_AT] {
            manager
                .drop_index(Index::drop().name(name).table(Tasks::Table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Status,
    Priority,
    CreatedAt,
}
