//! Indexes backing the list filters (species, age).
use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_animal::Animal;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_animal_species")
                    .table(Animal::Table)
                    .col(Animal::Species)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_animal_age")
                    .table(Animal::Table)
                    .col(Animal::Age)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_animal_age").table(Animal::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_animal_species").table(Animal::Table).to_owned())
            .await
    }
}
