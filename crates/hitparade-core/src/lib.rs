//! Core data model for hitparade.
//!
//! This crate defines the chart table, the per-song enrichment records and
//! the tables they merge into, provenance tags, and the on-disk snapshot
//! store that every pipeline stage reads from and writes to.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod provenance;
pub mod store;

pub use error::{Error, Result};
