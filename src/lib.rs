//! # mdr-index
//!
//! A writer/reader toolkit for MDR composite map index files — the
//! multi-section binary index that lets navigation software search the
//! countries, regions, cities, streets, points of interest and postal
//! codes of a merged set of maps by name.
//!
//! The writer ingests entities map by map, then serializes roughly two
//! dozen interdependent sections in one pass: pointer fields between
//! sections are 1–3 bytes wide depending on the final record count of the
//! section they point into, so all counts are resolved before any record
//! is encoded, and the sections are streamed in a fixed dependency order.
pub mod mdr;

// Re-export the main types for convenience
pub use mdr::{
    config::{BuildMode, MdrConfig, Sort},
    error::{MdrError, Result},
    reader::MdrReader,
    records::{CityId, CountryId, RegionId},
    MdrFile,
};
