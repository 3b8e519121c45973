//! Create `animal` table.
//! One row per animal; the id is assigned by the database.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Animal::Table)
                    .if_not_exists()
                    .col(pk_auto(Animal::Id))
                    .col(string_len(Animal::Species, 128).not_null())
                    .col(string_len(Animal::Name, 128).not_null())
                    .col(integer(Animal::Age).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Animal::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Animal {
    Table,
    Id,
    Species,
    Name,
    Age,
}
