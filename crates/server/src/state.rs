use std::sync::Arc;

use service::animal::{repository::AnimalRepository, AnimalService};

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub animals: Arc<AnimalService>,
}

impl ServerState {
    pub fn new(animals: AnimalService) -> Self {
        Self { animals: Arc::new(animals) }
    }

    pub fn with_repository(repo: Arc<dyn AnimalRepository>) -> Self {
        Self::new(AnimalService::new(repo))
    }
}
