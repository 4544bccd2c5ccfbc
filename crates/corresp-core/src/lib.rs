//! Core pipeline for reviewing construction-project correspondence.
//!
//! This crate is intentionally transport-agnostic. The CSV registry source and
//! the cloud-storage provider live behind ports (traits) implemented in adapter
//! crates; callers (CLI, HTTP, bots) drive the [`pipeline::Pipeline`].

pub mod classify;
pub mod config;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod logging;
pub mod pipeline;
pub mod ports;
pub mod registry;

pub use errors::{Error, Result};
