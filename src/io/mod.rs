//! Input/output helpers.
//!
//! - string table + CSV read/write (`table`)
//! - input ingest + validation (`ingest`)
//! - model artifact JSON read/write (`artifact`)
//! - output table exports (`export`)

pub mod artifact;
pub mod export;
pub mod ingest;
pub mod table;

pub use artifact::*;
pub use export::*;
pub use ingest::*;
pub use table::*;
