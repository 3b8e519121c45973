use serde::{Deserialize, Serialize};

use models::errors::ModelError;

pub use models::animal::{AnimalFilter, Model as Animal};

/// Request body for create and update.
///
/// `id` is ignored on create; on update it must equal the id in the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalInput {
    #[serde(default)]
    pub id: Option<i32>,
    pub species: String,
    pub name: String,
    pub age: i32,
}

impl AnimalInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        models::animal::validate_fields(&self.species, &self.name, self.age)
    }
}
