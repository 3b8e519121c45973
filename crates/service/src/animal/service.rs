use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::domain::{Animal, AnimalFilter, AnimalInput};
use super::repository::AnimalRepository;
use crate::errors::ServiceError;

/// Animal resource service independent of web framework.
///
/// Stateless between calls; every operation is a single pass through the
/// repository, apart from the existence re-check after an update conflict.
pub struct AnimalService {
    repo: Arc<dyn AnimalRepository>,
}

impl AnimalService {
    pub fn new(repo: Arc<dyn AnimalRepository>) -> Self { Self { repo } }

    /// All animals matching the filter. Never fails with `NotFound`.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: AnimalFilter) -> Result<Vec<Animal>, ServiceError> {
        self.repo.list(&filter).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<Animal, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("animal", id))
    }

    /// Store a new animal. Any id supplied by the caller is ignored.
    ///
    /// # Examples
    /// ```
    /// use service::animal::{AnimalService, domain::AnimalInput, repository::mock::MockAnimalRepository};
    /// use std::sync::Arc;
    /// let svc = AnimalService::new(Arc::new(MockAnimalRepository::default()));
    /// let input = AnimalInput { id: Some(99), species: "T-Rex".into(), name: "Rex".into(), age: 5 };
    /// let rex = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(rex.id, 1);
    /// assert_eq!(rex.species, "T-Rex");
    /// ```
    #[instrument(skip(self, input), fields(species = %input.species, name = %input.name))]
    pub async fn create(&self, input: AnimalInput) -> Result<Animal, ServiceError> {
        input.validate()?;
        let created = self.repo.create(&input).await?;
        info!(id = created.id, "animal_created");
        Ok(created)
    }

    /// Replace every field of animal `id`.
    ///
    /// The body id must equal `id`; otherwise nothing is written. When the
    /// store reports a conflict the row is looked up again: a missing row
    /// becomes `NotFound`, a present one is returned as `Conflict`.
    #[instrument(skip(self, input), fields(body_id = ?input.id))]
    pub async fn update(&self, id: i32, input: AnimalInput) -> Result<(), ServiceError> {
        if input.id != Some(id) {
            return Err(ServiceError::Validation(format!(
                "path id {} does not match body id {}",
                id,
                input.id.map_or_else(|| "<missing>".to_string(), |b| b.to_string())
            )));
        }
        input.validate()?;

        match self.repo.update(id, &input).await {
            Ok(_) => {
                info!(id, "animal_updated");
                Ok(())
            }
            Err(ServiceError::Conflict(msg)) => {
                if !self.repo.exists(id).await? {
                    warn!(id, "animal vanished during update");
                    return Err(ServiceError::not_found("animal", id));
                }
                error!(id, conflict = %msg, "unresolved concurrency conflict on update");
                Err(ServiceError::Conflict(msg))
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        if self.repo.get(id).await?.is_none() {
            return Err(ServiceError::not_found("animal", id));
        }
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("animal", id));
        }
        info!(id, "animal_deleted");
        Ok(())
    }
}
