//! Dataset loading for landing-kit.
//!
//! A build is driven by two tables, cities and products. They can live in
//! a local JSON document or behind a PostgREST-style HTTP endpoint; either
//! way the rows pass through the same validation before the generator
//! sees them, so a bad row costs one page set, never the whole run.

pub mod file;
pub mod remote;
pub mod rows;

pub use file::FileSource;
pub use remote::RemoteSource;
pub use rows::{RawCityRow, RawProductRow, validate_rows};
