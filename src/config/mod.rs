// src/config/mod.rs

//! Scenario files for the `tideps` binary.
//!
//! A scenario describes one DAG, its run history and the evaluation
//! context:
//! - [`model`] is the TOML-backed data model.
//! - [`loader`] reads a file from disk.
//! - [`validate`] checks DAG shape and history references.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{
    ConfigFile, ConfigSection, DagRunConfig, DagSection, RawConfigFile, TaskConfig,
    TaskInstanceConfig,
};
pub use validate::validate_config;
