//! Manifest data model, validation, and JSON Schema generation for Tundra.
//!
//! This crate defines the schema layer: the typed manifest model
//! (`Manifest` and its nested entities), closed-world validation of raw
//! TOML documents (`validate_document`, `parse_manifest_str`), the
//! violation taxonomy (`Violation`), reusable scalar constraints, and
//! the JSON Schema artifact generator (`schema_document`).

pub mod constraint;
pub mod error;
pub mod fields;
pub mod manifest;
pub mod schema;
pub mod validate;

pub use error::{FieldPath, ManifestError, PathSegment, Violation, ViolationKind};
pub use fields::{EntityDef, FieldDef, Shape};
pub use manifest::{
    Activation, Channel, ChannelTable, CommandList, Environment, EnvironmentTable, Feature,
    LibcFamily, LibcRequirement, Manifest, MatchSpec, MatchSpecTable, Project, PyPiRequirement,
    PyPiRequirementTable, SystemRequirements, Target, Task, TaskTable, UnixSpec, VersionSpec,
};
pub use schema::{schema_document, schema_json};
pub use validate::{parse_manifest_file, parse_manifest_str, validate_document};
