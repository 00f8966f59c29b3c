//! The typed manifest data model.
//!
//! Every type here is an immutable value produced by validation; maps are
//! `BTreeMap` for deterministic iteration and `Option` marks the explicit
//! absent state, distinct from an empty collection. Serialization uses the
//! external (hyphenated) spellings and untagged enums, so a validated
//! manifest round-trips through its raw document form.

use serde::Serialize;
use std::collections::BTreeMap;

/// Root of a validated manifest document.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Manifest {
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, MatchSpec>>,
    #[serde(rename = "host-dependencies", skip_serializing_if = "Option::is_none")]
    pub host_dependencies: Option<BTreeMap<String, MatchSpec>>,
    #[serde(rename = "build-dependencies", skip_serializing_if = "Option::is_none")]
    pub build_dependencies: Option<BTreeMap<String, MatchSpec>>,
    #[serde(rename = "pypi-dependencies", skip_serializing_if = "Option::is_none")]
    pub pypi_dependencies: Option<BTreeMap<String, PyPiRequirement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<BTreeMap<String, Task>>,
    #[serde(
        rename = "system-requirements",
        skip_serializing_if = "Option::is_none"
    )]
    pub system_requirements: Option<SystemRequirements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environments: Option<BTreeMap<String, Environment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<BTreeMap<String, Feature>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<Activation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<BTreeMap<String, Target>>,
}

impl Manifest {
    /// Render the manifest back into its raw document form.
    pub fn to_document(&self) -> Result<toml::Value, toml::ser::Error> {
        toml::Value::try_from(self)
    }
}

/// Root-level project metadata.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<Channel>>,
    pub platforms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// A conda channel reference: a bare name/URL or a table with priority.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Channel {
    Name(String),
    Table(ChannelTable),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChannelTable {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

/// A conda dependency requirement: a bare version string or a split table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MatchSpec {
    Version(String),
    Table(MatchSpecTable),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MatchSpecTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// A PyPI dependency requirement: a bare version string or a split table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PyPiRequirement {
    Version(String),
    Table(PyPiRequirementTable),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PyPiRequirementTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<Vec<String>>,
}

/// A task: an inline table or a bare command string. The table
/// alternative is declared first and wins resolution.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Task {
    Table(TaskTable),
    Command(String),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<CommandList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<CommandList>,
}

/// A string-or-list-of-strings field; the list alternative is declared
/// first.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CommandList {
    Many(Vec<String>),
    One(String),
}

/// A float-or-string version requirement.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum VersionSpec {
    Number(f64),
    Text(String),
}

/// A bool-or-string flag.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum UnixSpec {
    Enabled(bool),
    Text(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LibcFamily {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionSpec>,
}

/// The libc requirement: a family table, a bare version number, or a
/// version string.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum LibcRequirement {
    Family(LibcFamily),
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SystemRequirements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linux: Option<VersionSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unix: Option<UnixSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libc: Option<LibcRequirement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuda: Option<VersionSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archspec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macos: Option<VersionSpec>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Activation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Vec<String>>,
}

/// An environment: a table of features and solve group, or a bare list
/// of feature names. The table alternative is declared first.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Environment {
    Table(EnvironmentTable),
    Features(Vec<String>),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnvironmentTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(rename = "solve-group", skip_serializing_if = "Option::is_none")]
    pub solve_group: Option<String>,
}

/// A platform-specific override bundle.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Target {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, MatchSpec>>,
    #[serde(rename = "host-dependencies", skip_serializing_if = "Option::is_none")]
    pub host_dependencies: Option<BTreeMap<String, MatchSpec>>,
    #[serde(rename = "build-dependencies", skip_serializing_if = "Option::is_none")]
    pub build_dependencies: Option<BTreeMap<String, MatchSpec>>,
    #[serde(rename = "pypi-dependencies", skip_serializing_if = "Option::is_none")]
    pub pypi_dependencies: Option<BTreeMap<String, PyPiRequirement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<BTreeMap<String, Task>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<Activation>,
}

/// A named, composable bundle; everything a [`Target`] has plus
/// channels, platforms, system requirements, and per-platform targets.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Feature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<Channel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, MatchSpec>>,
    #[serde(rename = "host-dependencies", skip_serializing_if = "Option::is_none")]
    pub host_dependencies: Option<BTreeMap<String, MatchSpec>>,
    #[serde(rename = "build-dependencies", skip_serializing_if = "Option::is_none")]
    pub build_dependencies: Option<BTreeMap<String, MatchSpec>>,
    #[serde(rename = "pypi-dependencies", skip_serializing_if = "Option::is_none")]
    pub pypi_dependencies: Option<BTreeMap<String, PyPiRequirement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<BTreeMap<String, Task>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<Activation>,
    #[serde(
        rename = "system-requirements",
        skip_serializing_if = "Option::is_none"
    )]
    pub system_requirements: Option<SystemRequirements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<BTreeMap<String, Target>>,
}
