//! Pieces shared by the server crate and the binary: logging setup and
//! small response types.

pub mod types;
pub mod utils;
