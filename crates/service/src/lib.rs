//! Service layer for the animal resource.
//! - Separates the request-level rules (id checks, conflict handling) from data access.
//! - Reuses validation, filter and entity definitions from the `models` crate.

pub mod errors;
pub mod animal;
#[cfg(test)]
pub mod test_support;
