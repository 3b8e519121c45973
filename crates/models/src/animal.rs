use sea_orm::{entity::prelude::*, Condition, DatabaseConnection, NotSet, QueryOrder, Set, Unchanged};
use serde::{Deserialize, Serialize};

use crate::errors;

/// Upper bound on `species` and `name`, matching the column width.
pub const MAX_TEXT_LEN: usize = 128;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "animal")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub species: String,
    pub name: String,
    pub age: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_age(age: i32) -> Result<(), errors::ModelError> {
    if age < 0 {
        return Err(errors::ModelError::Validation("age must be >= 0".into()));
    }
    Ok(())
}

pub fn validate_text(field: &str, value: &str) -> Result<(), errors::ModelError> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(errors::ModelError::Validation(format!("{field} must be at most {MAX_TEXT_LEN} characters")));
    }
    Ok(())
}

pub fn validate_fields(species: &str, name: &str, age: i32) -> Result<(), errors::ModelError> {
    validate_text("species", species)?;
    validate_text("name", name)?;
    validate_age(age)
}

/// Filter criteria for listing animals.
///
/// Every present field narrows the result (logical AND). Construction goes
/// through [`AnimalFilter::new`], which drops empty strings and any
/// `minimum_age` that is not strictly positive: a minimum age of `0` means
/// "no age filter", not `age >= 0`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimalFilter {
    species: Option<String>,
    name: Option<String>,
    minimum_age: Option<i32>,
}

impl AnimalFilter {
    pub fn new(species: Option<String>, name: Option<String>, minimum_age: Option<i32>) -> Self {
        Self {
            species: species.filter(|s| !s.is_empty()),
            name: name.filter(|s| !s.is_empty()),
            minimum_age: minimum_age.filter(|a| *a > 0),
        }
    }

    pub fn minimum_age(&self) -> Option<i32> { self.minimum_age }

    /// Single predicate evaluated by the database.
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(species) = &self.species {
            cond = cond.add(Column::Species.eq(species.clone()));
        }
        if let Some(name) = &self.name {
            cond = cond.add(Column::Name.eq(name.clone()));
        }
        if let Some(min) = self.minimum_age {
            cond = cond.add(Column::Age.gte(min));
        }
        cond
    }

    /// Same predicate as [`AnimalFilter::condition`], evaluated in memory.
    pub fn matches(&self, animal: &Model) -> bool {
        self.species.as_deref().map_or(true, |s| animal.species == s)
            && self.name.as_deref().map_or(true, |n| animal.name == n)
            && self.minimum_age.map_or(true, |min| animal.age >= min)
    }
}

pub async fn list(db: &DatabaseConnection, filter: &AnimalFilter) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(filter.condition())
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn create(db: &DatabaseConnection, species: &str, name: &str, age: i32) -> Result<Model, errors::ModelError> {
    validate_fields(species, name, age)?;
    let am = ActiveModel {
        id: NotSet,
        species: Set(species.to_string()),
        name: Set(name.to_string()),
        age: Set(age),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Overwrite every column of row `id`.
///
/// Returns `ModelError::NotUpdated` when the database applied the update to
/// no row.
pub async fn replace(db: &DatabaseConnection, id: i32, species: &str, name: &str, age: i32) -> Result<Model, errors::ModelError> {
    validate_fields(species, name, age)?;
    let am = ActiveModel {
        id: Unchanged(id),
        species: Set(species.to_string()),
        name: Set(name.to_string()),
        age: Set(age),
    };
    match am.update(db).await {
        Ok(m) => Ok(m),
        Err(DbErr::RecordNotUpdated) => Err(errors::ModelError::NotUpdated(id)),
        Err(e) => Err(errors::ModelError::Db(e.to_string())),
    }
}
