use async_trait::async_trait;

use super::domain::{Animal, AnimalFilter, AnimalInput};
use crate::errors::ServiceError;

/// Repository abstraction for animal persistence.
#[async_trait]
pub trait AnimalRepository: Send + Sync {
    async fn list(&self, filter: &AnimalFilter) -> Result<Vec<Animal>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<Animal>, ServiceError>;
    /// Insert a new row; the store assigns the id.
    async fn create(&self, input: &AnimalInput) -> Result<Animal, ServiceError>;
    /// Replace every field of row `id`. Returns `ServiceError::Conflict`
    /// when the store updated no row.
    async fn update(&self, id: i32, input: &AnimalInput) -> Result<Animal, ServiceError>;
    /// Returns true if a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    async fn exists(&self, id: i32) -> Result<bool, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    /// How the next `update` call should collide.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum UpdateConflict {
        /// Another writer changed the row; it still exists.
        RecordPresent,
        /// Another writer deleted the row before the update landed.
        RecordDeleted,
    }

    #[derive(Default)]
    pub struct MockAnimalRepository {
        rows: Mutex<BTreeMap<i32, Animal>>,
        last_id: AtomicI32,
        pending_conflict: Mutex<Option<UpdateConflict>>,
        writes: AtomicUsize,
    }

    impl MockAnimalRepository {
        /// Make the next `update` fail with a conflict.
        pub fn inject_update_conflict(&self, kind: UpdateConflict) {
            if let Ok(mut pending) = self.pending_conflict.lock() {
                *pending = Some(kind);
            }
        }

        /// Number of create/update/delete calls that reached the repository.
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<i32, Animal>>, ServiceError> {
            self.rows.lock().map_err(|_| ServiceError::Db("mock repository lock poisoned".into()))
        }

        fn take_conflict(&self) -> Option<UpdateConflict> {
            self.pending_conflict.lock().ok().and_then(|mut p| p.take())
        }
    }

    #[async_trait]
    impl AnimalRepository for MockAnimalRepository {
        async fn list(&self, filter: &AnimalFilter) -> Result<Vec<Animal>, ServiceError> {
            let rows = self.rows()?;
            Ok(rows.values().filter(|a| filter.matches(a)).cloned().collect())
        }

        async fn get(&self, id: i32) -> Result<Option<Animal>, ServiceError> {
            Ok(self.rows()?.get(&id).cloned())
        }

        async fn create(&self, input: &AnimalInput) -> Result<Animal, ServiceError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
            let animal = Animal { id, species: input.species.clone(), name: input.name.clone(), age: input.age };
            self.rows()?.insert(id, animal.clone());
            Ok(animal)
        }

        async fn update(&self, id: i32, input: &AnimalInput) -> Result<Animal, ServiceError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let conflict = self.take_conflict();
            let mut rows = self.rows()?;
            if let Some(kind) = conflict {
                if kind == UpdateConflict::RecordDeleted {
                    rows.remove(&id);
                }
                return Err(ServiceError::Conflict(format!("animal {} was modified concurrently", id)));
            }
            match rows.get_mut(&id) {
                Some(row) => {
                    row.species = input.species.clone();
                    row.name = input.name.clone();
                    row.age = input.age;
                    Ok(row.clone())
                }
                None => Err(ServiceError::Conflict(format!("animal {} was not updated", id))),
            }
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows()?.remove(&id).is_some())
        }

        async fn exists(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.rows()?.contains_key(&id))
        }
    }
}
