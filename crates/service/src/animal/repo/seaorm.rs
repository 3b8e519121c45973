use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::animal::domain::{Animal, AnimalFilter, AnimalInput};
use crate::animal::repository::AnimalRepository;
use crate::errors::ServiceError;

/// SeaORM-backed repository implementation.
pub struct SeaOrmAnimalRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl AnimalRepository for SeaOrmAnimalRepository {
    async fn list(&self, filter: &AnimalFilter) -> Result<Vec<Animal>, ServiceError> {
        Ok(models::animal::list(&self.db, filter).await?)
    }

    async fn get(&self, id: i32) -> Result<Option<Animal>, ServiceError> {
        models::animal::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn create(&self, input: &AnimalInput) -> Result<Animal, ServiceError> {
        Ok(models::animal::create(&self.db, &input.species, &input.name, input.age).await?)
    }

    async fn update(&self, id: i32, input: &AnimalInput) -> Result<Animal, ServiceError> {
        Ok(models::animal::replace(&self.db, id, &input.species, &input.name, input.age).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let res = models::animal::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(res.rows_affected > 0)
    }

    async fn exists(&self, id: i32) -> Result<bool, ServiceError> {
        let n = models::animal::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(n > 0)
    }
}
