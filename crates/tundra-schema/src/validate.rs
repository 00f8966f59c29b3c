//! Top-down validation of a raw document against the manifest contract.
//!
//! Validation is a pure function from a raw `toml::Value` tree to either a
//! fully-typed [`Manifest`] or a complete list of [`Violation`]s. Entities
//! never short-circuit: unknown keys, missing required fields, and nested
//! failures are all collected before an entity reports failure, so a
//! single pass surfaces every problem at once.

use crate::constraint;
use crate::error::{FieldPath, ManifestError, Violation, ViolationKind};
use crate::fields::{self, EntityDef};
use crate::manifest::{
    Activation, Channel, ChannelTable, CommandList, Environment, EnvironmentTable, Feature,
    LibcFamily, LibcRequirement, Manifest, MatchSpec, MatchSpecTable, Project, PyPiRequirement,
    PyPiRequirementTable, SystemRequirements, Target, Task, TaskTable, UnixSpec, VersionSpec,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use toml::Value;

type VResult<T> = Result<T, Vec<Violation>>;

/// Validate a raw document tree as a manifest.
pub fn validate_document(document: &Value) -> Result<Manifest, Vec<Violation>> {
    let mut cx = TableContext::new(&FieldPath::root(), document, &fields::MANIFEST)?;
    let project = cx.field("project", project);
    let dependencies = cx.field("dependencies", |p, v| map_of(p, v, match_spec));
    let host_dependencies = cx.field("host-dependencies", |p, v| map_of(p, v, match_spec));
    let build_dependencies = cx.field("build-dependencies", |p, v| map_of(p, v, match_spec));
    let pypi_dependencies = cx.field("pypi-dependencies", |p, v| map_of(p, v, pypi_requirement));
    let tasks = cx.field("tasks", |p, v| map_of(p, v, task));
    let system_requirements = cx.field("system-requirements", system_requirements);
    let environments = cx.field("environments", |p, v| map_of(p, v, environment));
    let feature = cx.field("feature", |p, v| map_of(p, v, feature));
    let activation = cx.field("activation", activation);
    let target = cx.field("target", |p, v| map_of(p, v, target));
    let violations = cx.finish();
    match project {
        Some(project) if violations.is_empty() => Ok(Manifest {
            project,
            dependencies,
            host_dependencies,
            build_dependencies,
            pypi_dependencies,
            tasks,
            system_requirements,
            environments,
            feature,
            activation,
            target,
        }),
        _ => Err(violations),
    }
}

/// Parse TOML text and validate it as a manifest.
pub fn parse_manifest_str(input: &str) -> Result<Manifest, ManifestError> {
    let document: Value = toml::from_str(input)?;
    validate_document(&document).map_err(ManifestError::Invalid)
}

/// Read a manifest file, parse it, and validate it.
pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}

/// Closed-world validation context for one entity table.
///
/// Construction sweeps the input for keys the entity does not declare and
/// records every one as an `UnknownField`; `field` then pulls declared
/// fields out one by one, recording `MissingField` for absent required
/// fields and aggregating nested violations.
struct TableContext<'a> {
    path: FieldPath,
    table: &'a toml::map::Map<String, Value>,
    entity: &'static EntityDef,
    violations: Vec<Violation>,
}

impl<'a> TableContext<'a> {
    fn new(path: &FieldPath, value: &'a Value, entity: &'static EntityDef) -> VResult<Self> {
        let Value::Table(table) = value else {
            return Err(type_mismatch(path, "table", value));
        };
        let mut violations = Vec::new();
        for key in table.keys() {
            if !entity.declares(key) {
                violations.push(Violation::new(
                    path.key(key),
                    ViolationKind::UnknownField,
                    format!("unknown field '{key}' in {}", entity.name),
                ));
            }
        }
        Ok(Self {
            path: path.clone(),
            table,
            entity,
            violations,
        })
    }

    fn field<T>(
        &mut self,
        name: &'static str,
        parse: impl FnOnce(&FieldPath, &Value) -> VResult<T>,
    ) -> Option<T> {
        let def = self
            .entity
            .field(name)
            .expect("field accessors only name declared fields");
        match self.table.get(name) {
            Some(value) => match parse(&self.path.key(name), value) {
                Ok(parsed) => Some(parsed),
                Err(nested) => {
                    self.violations.extend(nested);
                    None
                }
            },
            None => {
                if def.required {
                    self.violations.push(Violation::new(
                        self.path.key(name),
                        ViolationKind::MissingField,
                        format!("required field '{name}' is missing"),
                    ));
                }
                None
            }
        }
    }

    fn finish(self) -> Vec<Violation> {
        self.violations
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::Boolean(_) => "boolean",
        Value::Datetime(_) => "datetime",
        Value::Array(_) => "list",
        Value::Table(_) => "table",
    }
}

fn type_mismatch(path: &FieldPath, expected: &str, value: &Value) -> Vec<Violation> {
    vec![Violation::new(
        path.clone(),
        ViolationKind::TypeMismatch,
        format!("expected {expected}, found {}", type_name(value)),
    )]
}

fn constraint_violation(path: &FieldPath, message: String) -> Vec<Violation> {
    vec![Violation::new(
        path.clone(),
        ViolationKind::ConstraintViolation,
        message,
    )]
}

/// Ordered polymorphic resolution: try each alternative in declared
/// order, first structural match wins; total failure reports a single
/// `ShapeMismatch` naming every alternative and why it failed.
fn first_of<T>(
    path: &FieldPath,
    value: &Value,
    alternatives: &[(&str, &dyn Fn(&FieldPath, &Value) -> VResult<T>)],
) -> VResult<T> {
    let mut reasons = Vec::with_capacity(alternatives.len());
    for (label, parse) in alternatives {
        match parse(path, value) {
            Ok(parsed) => return Ok(parsed),
            Err(nested) => {
                let why = nested
                    .iter()
                    .map(|v| v.message.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                reasons.push(format!("{label} ({why})"));
            }
        }
    }
    Err(vec![Violation::new(
        path.clone(),
        ViolationKind::ShapeMismatch,
        format!("matches none of the expected shapes: {}", reasons.join("; ")),
    )])
}

fn list_of<T>(
    path: &FieldPath,
    value: &Value,
    item: impl Fn(&FieldPath, &Value) -> VResult<T>,
) -> VResult<Vec<T>> {
    let Value::Array(entries) = value else {
        return Err(type_mismatch(path, "list", value));
    };
    let mut out = Vec::with_capacity(entries.len());
    let mut violations = Vec::new();
    for (position, entry) in entries.iter().enumerate() {
        match item(&path.index(position), entry) {
            Ok(parsed) => out.push(parsed),
            Err(nested) => violations.extend(nested),
        }
    }
    if violations.is_empty() {
        Ok(out)
    } else {
        Err(violations)
    }
}

fn map_of<T>(
    path: &FieldPath,
    value: &Value,
    item: impl Fn(&FieldPath, &Value) -> VResult<T>,
) -> VResult<BTreeMap<String, T>> {
    let Value::Table(entries) = value else {
        return Err(type_mismatch(path, "table", value));
    };
    let mut out = BTreeMap::new();
    let mut violations = Vec::new();
    for (key, entry) in entries {
        let child = path.key(key);
        if key.is_empty() {
            violations.push(Violation::new(
                child,
                ViolationKind::ConstraintViolation,
                "map keys must be non-empty strings".to_owned(),
            ));
            continue;
        }
        match item(&child, entry) {
            Ok(parsed) => {
                out.insert(key.clone(), parsed);
            }
            Err(nested) => violations.extend(nested),
        }
    }
    if violations.is_empty() {
        Ok(out)
    } else {
        Err(violations)
    }
}

// Scalar parsers.

fn scalar_str<'a>(path: &FieldPath, value: &'a Value) -> VResult<&'a str> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(type_mismatch(path, "string", other)),
    }
}

fn non_empty_string(path: &FieldPath, value: &Value) -> VResult<String> {
    let s = scalar_str(path, value)?;
    constraint::non_empty(s).map_err(|m| constraint_violation(path, m))?;
    Ok(s.to_owned())
}

fn portable_path(path: &FieldPath, value: &Value) -> VResult<String> {
    let s = scalar_str(path, value)?;
    constraint::path_no_backslash(s).map_err(|m| constraint_violation(path, m))?;
    Ok(s.to_owned())
}

fn url_string(path: &FieldPath, value: &Value) -> VResult<String> {
    let s = scalar_str(path, value)?;
    constraint::http_url(s).map_err(|m| constraint_violation(path, m))?;
    Ok(s.to_owned())
}

fn integer(path: &FieldPath, value: &Value) -> VResult<i64> {
    match value {
        Value::Integer(i) => Ok(*i),
        other => Err(type_mismatch(path, "integer", other)),
    }
}

fn float_number(path: &FieldPath, value: &Value) -> VResult<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Integer(i) => Ok(*i as f64),
        other => Err(type_mismatch(path, "number", other)),
    }
}

fn positive_number(path: &FieldPath, value: &Value) -> VResult<f64> {
    let f = float_number(path, value)?;
    constraint::positive_float(f).map_err(|m| constraint_violation(path, m))?;
    Ok(f)
}

fn boolean(path: &FieldPath, value: &Value) -> VResult<bool> {
    match value {
        Value::Boolean(b) => Ok(*b),
        other => Err(type_mismatch(path, "boolean", other)),
    }
}

fn string_list(path: &FieldPath, value: &Value) -> VResult<Vec<String>> {
    list_of(path, value, non_empty_string)
}

// Entity parsers, leaves first.

fn channel(path: &FieldPath, value: &Value) -> VResult<Channel> {
    first_of(
        path,
        value,
        &[
            ("channel name", &|p, v| {
                non_empty_string(p, v).map(Channel::Name)
            }),
            ("channel table", &|p, v| {
                channel_table(p, v).map(Channel::Table)
            }),
        ],
    )
}

fn channel_table(path: &FieldPath, value: &Value) -> VResult<ChannelTable> {
    let mut cx = TableContext::new(path, value, &fields::CHANNEL_TABLE)?;
    let name = cx.field("channel", non_empty_string);
    let priority = cx.field("priority", integer);
    let violations = cx.finish();
    match name {
        Some(channel) if violations.is_empty() => Ok(ChannelTable { channel, priority }),
        _ => Err(violations),
    }
}

fn match_spec(path: &FieldPath, value: &Value) -> VResult<MatchSpec> {
    first_of(
        path,
        value,
        &[
            ("version string", &|p, v| {
                non_empty_string(p, v).map(MatchSpec::Version)
            }),
            ("match spec table", &|p, v| {
                match_spec_table(p, v).map(MatchSpec::Table)
            }),
        ],
    )
}

fn match_spec_table(path: &FieldPath, value: &Value) -> VResult<MatchSpecTable> {
    let mut cx = TableContext::new(path, value, &fields::MATCH_SPEC_TABLE)?;
    let version = cx.field("version", non_empty_string);
    let build = cx.field("build", non_empty_string);
    let channel = cx.field("channel", non_empty_string);
    let violations = cx.finish();
    if violations.is_empty() {
        Ok(MatchSpecTable {
            version,
            build,
            channel,
        })
    } else {
        Err(violations)
    }
}

fn pypi_requirement(path: &FieldPath, value: &Value) -> VResult<PyPiRequirement> {
    first_of(
        path,
        value,
        &[
            ("version string", &|p, v| {
                non_empty_string(p, v).map(PyPiRequirement::Version)
            }),
            ("requirement table", &|p, v| {
                pypi_requirement_table(p, v).map(PyPiRequirement::Table)
            }),
        ],
    )
}

fn pypi_requirement_table(path: &FieldPath, value: &Value) -> VResult<PyPiRequirementTable> {
    let mut cx = TableContext::new(path, value, &fields::PYPI_REQUIREMENT_TABLE)?;
    let version = cx.field("version", non_empty_string);
    let extras = cx.field("extras", string_list);
    let violations = cx.finish();
    if violations.is_empty() {
        Ok(PyPiRequirementTable { version, extras })
    } else {
        Err(violations)
    }
}

fn command_list(path: &FieldPath, value: &Value) -> VResult<CommandList> {
    first_of(
        path,
        value,
        &[
            ("string list", &|p, v| string_list(p, v).map(CommandList::Many)),
            ("single string", &|p, v| {
                non_empty_string(p, v).map(CommandList::One)
            }),
        ],
    )
}

fn task(path: &FieldPath, value: &Value) -> VResult<Task> {
    first_of(
        path,
        value,
        &[
            ("task table", &|p, v| task_table(p, v).map(Task::Table)),
            ("command string", &|p, v| {
                non_empty_string(p, v).map(Task::Command)
            }),
        ],
    )
}

fn task_table(path: &FieldPath, value: &Value) -> VResult<TaskTable> {
    let mut cx = TableContext::new(path, value, &fields::TASK_TABLE)?;
    let cmd = cx.field("cmd", command_list);
    let cwd = cx.field("cwd", portable_path);
    let depends_on = cx.field("depends_on", command_list);
    let violations = cx.finish();
    if violations.is_empty() {
        Ok(TaskTable {
            cmd,
            cwd,
            depends_on,
        })
    } else {
        Err(violations)
    }
}

fn version_spec(path: &FieldPath, value: &Value) -> VResult<VersionSpec> {
    first_of(
        path,
        value,
        &[
            ("version number", &|p, v| {
                float_number(p, v).map(VersionSpec::Number)
            }),
            ("version string", &|p, v| {
                non_empty_string(p, v).map(VersionSpec::Text)
            }),
        ],
    )
}

fn positive_version_spec(path: &FieldPath, value: &Value) -> VResult<VersionSpec> {
    first_of(
        path,
        value,
        &[
            ("positive version number", &|p, v| {
                positive_number(p, v).map(VersionSpec::Number)
            }),
            ("version string", &|p, v| {
                non_empty_string(p, v).map(VersionSpec::Text)
            }),
        ],
    )
}

fn unix_spec(path: &FieldPath, value: &Value) -> VResult<UnixSpec> {
    first_of(
        path,
        value,
        &[
            ("boolean", &|p, v| boolean(p, v).map(UnixSpec::Enabled)),
            ("string", &|p, v| non_empty_string(p, v).map(UnixSpec::Text)),
        ],
    )
}

fn libc_family(path: &FieldPath, value: &Value) -> VResult<LibcFamily> {
    let mut cx = TableContext::new(path, value, &fields::LIBC_FAMILY)?;
    let family = cx.field("family", non_empty_string);
    let version = cx.field("version", version_spec);
    let violations = cx.finish();
    if violations.is_empty() {
        Ok(LibcFamily { family, version })
    } else {
        Err(violations)
    }
}

fn libc_requirement(path: &FieldPath, value: &Value) -> VResult<LibcRequirement> {
    first_of(
        path,
        value,
        &[
            ("libc family table", &|p, v| {
                libc_family(p, v).map(LibcRequirement::Family)
            }),
            ("version number", &|p, v| {
                float_number(p, v).map(LibcRequirement::Number)
            }),
            ("version string", &|p, v| {
                non_empty_string(p, v).map(LibcRequirement::Text)
            }),
        ],
    )
}

fn system_requirements(path: &FieldPath, value: &Value) -> VResult<SystemRequirements> {
    let mut cx = TableContext::new(path, value, &fields::SYSTEM_REQUIREMENTS)?;
    let linux = cx.field("linux", positive_version_spec);
    let unix = cx.field("unix", unix_spec);
    let libc = cx.field("libc", libc_requirement);
    let cuda = cx.field("cuda", version_spec);
    let archspec = cx.field("archspec", non_empty_string);
    let macos = cx.field("macos", positive_version_spec);
    let violations = cx.finish();
    if violations.is_empty() {
        Ok(SystemRequirements {
            linux,
            unix,
            libc,
            cuda,
            archspec,
            macos,
        })
    } else {
        Err(violations)
    }
}

fn activation(path: &FieldPath, value: &Value) -> VResult<Activation> {
    let mut cx = TableContext::new(path, value, &fields::ACTIVATION)?;
    let scripts = cx.field("scripts", string_list);
    let violations = cx.finish();
    if violations.is_empty() {
        Ok(Activation { scripts })
    } else {
        Err(violations)
    }
}

fn environment(path: &FieldPath, value: &Value) -> VResult<Environment> {
    first_of(
        path,
        value,
        &[
            ("environment table", &|p, v| {
                environment_table(p, v).map(Environment::Table)
            }),
            ("feature name list", &|p, v| {
                string_list(p, v).map(Environment::Features)
            }),
        ],
    )
}

fn environment_table(path: &FieldPath, value: &Value) -> VResult<EnvironmentTable> {
    let mut cx = TableContext::new(path, value, &fields::ENVIRONMENT)?;
    let features = cx.field("features", string_list);
    let solve_group = cx.field("solve-group", non_empty_string);
    let violations = cx.finish();
    if violations.is_empty() {
        Ok(EnvironmentTable {
            features,
            solve_group,
        })
    } else {
        Err(violations)
    }
}

fn project(path: &FieldPath, value: &Value) -> VResult<Project> {
    let mut cx = TableContext::new(path, value, &fields::PROJECT)?;
    let name = cx.field("name", non_empty_string);
    let version = cx.field("version", non_empty_string);
    let description = cx.field("description", non_empty_string);
    let authors = cx.field("authors", string_list);
    let channels = cx.field("channels", |p, v| list_of(p, v, channel));
    let platforms = cx.field("platforms", string_list);
    let license = cx.field("license", non_empty_string);
    let license_file = cx.field("license_file", portable_path);
    let readme = cx.field("readme", portable_path);
    let homepage = cx.field("homepage", url_string);
    let repository = cx.field("repository", url_string);
    let documentation = cx.field("documentation", url_string);
    let violations = cx.finish();
    match (name, platforms) {
        (Some(name), Some(platforms)) if violations.is_empty() => Ok(Project {
            name,
            version,
            description,
            authors,
            channels,
            platforms,
            license,
            license_file,
            readme,
            homepage,
            repository,
            documentation,
        }),
        _ => Err(violations),
    }
}

fn target(path: &FieldPath, value: &Value) -> VResult<Target> {
    let mut cx = TableContext::new(path, value, &fields::TARGET)?;
    let dependencies = cx.field("dependencies", |p, v| map_of(p, v, match_spec));
    let host_dependencies = cx.field("host-dependencies", |p, v| map_of(p, v, match_spec));
    let build_dependencies = cx.field("build-dependencies", |p, v| map_of(p, v, match_spec));
    let pypi_dependencies = cx.field("pypi-dependencies", |p, v| map_of(p, v, pypi_requirement));
    let tasks = cx.field("tasks", |p, v| map_of(p, v, task));
    let activation = cx.field("activation", activation);
    let violations = cx.finish();
    if violations.is_empty() {
        Ok(Target {
            dependencies,
            host_dependencies,
            build_dependencies,
            pypi_dependencies,
            tasks,
            activation,
        })
    } else {
        Err(violations)
    }
}

fn feature(path: &FieldPath, value: &Value) -> VResult<Feature> {
    let mut cx = TableContext::new(path, value, &fields::FEATURE)?;
    let channels = cx.field("channels", |p, v| list_of(p, v, channel));
    let platforms = cx.field("platforms", string_list);
    let dependencies = cx.field("dependencies", |p, v| map_of(p, v, match_spec));
    let host_dependencies = cx.field("host-dependencies", |p, v| map_of(p, v, match_spec));
    let build_dependencies = cx.field("build-dependencies", |p, v| map_of(p, v, match_spec));
    let pypi_dependencies = cx.field("pypi-dependencies", |p, v| map_of(p, v, pypi_requirement));
    let tasks = cx.field("tasks", |p, v| map_of(p, v, task));
    let activation = cx.field("activation", activation);
    let system_requirements = cx.field("system-requirements", system_requirements);
    let target = cx.field("target", |p, v| map_of(p, v, target));
    let violations = cx.finish();
    if violations.is_empty() {
        Ok(Feature {
            channels,
            platforms,
            dependencies,
            host_dependencies,
            build_dependencies,
            pypi_dependencies,
            tasks,
            activation,
            system_requirements,
            target,
        })
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(input: &str) -> Value {
        toml::from_str(input).expect("test TOML parses")
    }

    fn violations(input: &str) -> Vec<Violation> {
        validate_document(&document(input)).expect_err("expected validation failure")
    }

    const MINIMAL: &str = r#"
[project]
name = "demo"
platforms = ["linux-64"]
channels = ["conda-forge"]
"#;

    #[test]
    fn minimal_manifest_validates_with_all_optionals_absent() {
        let manifest = validate_document(&document(MINIMAL)).expect("should validate");
        assert_eq!(manifest.project.name, "demo");
        assert_eq!(manifest.project.platforms, vec!["linux-64"]);
        assert_eq!(
            manifest.project.channels,
            Some(vec![Channel::Name("conda-forge".to_owned())])
        );
        assert!(manifest.dependencies.is_none());
        assert!(manifest.tasks.is_none());
        assert!(manifest.environments.is_none());
        assert!(manifest.feature.is_none());
        assert!(manifest.activation.is_none());
        assert!(manifest.target.is_none());
    }

    #[test]
    fn missing_project_name_reports_one_missing_field() {
        let vs = violations(
            r#"
[project]
platforms = ["linux-64"]
"#,
        );
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].kind, ViolationKind::MissingField);
        assert_eq!(vs[0].path.to_string(), "project.name");
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let vs = violations(&format!(
            "{MINIMAL}\n[host-dependencies]\npython = \"3.11\"\n\n[bogus-key]\nx = 1\n"
        ));
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].kind, ViolationKind::UnknownField);
        assert_eq!(vs[0].path.to_string(), "bogus-key");
    }

    #[test]
    fn underscored_alias_spelling_is_an_unknown_field() {
        let vs = violations(&format!(
            "{MINIMAL}\n[host_dependencies]\npython = \"3.11\"\n"
        ));
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].kind, ViolationKind::UnknownField);
        assert_eq!(vs[0].path.to_string(), "host_dependencies");
    }

    #[test]
    fn hyphenated_alias_spelling_is_accepted() {
        let manifest = validate_document(&document(&format!(
            "{MINIMAL}\n[host-dependencies]\npython = \"3.11\"\n"
        )))
        .expect("should validate");
        let deps = manifest.host_dependencies.expect("present");
        assert_eq!(
            deps["python"],
            MatchSpec::Version("3.11".to_owned())
        );
    }

    #[test]
    fn all_violations_are_aggregated_in_one_pass() {
        // Four independent problems: missing name, empty platform entry,
        // unknown project field, unknown top-level field.
        let vs = violations(
            r#"
extra = 1

[project]
platforms = [""]
nickname = "d"
"#,
        );
        assert!(vs.len() >= 4, "expected >= 4 violations, got {vs:?}");
        let kinds: Vec<_> = vs.iter().map(|v| v.kind).collect();
        assert!(kinds.contains(&ViolationKind::MissingField));
        assert!(kinds.contains(&ViolationKind::ConstraintViolation));
        assert!(kinds.contains(&ViolationKind::UnknownField));
    }

    #[test]
    fn task_depends_on_resolves_to_single_string_alternative() {
        let manifest = validate_document(&document(&format!(
            "{MINIMAL}\n[tasks]\nbuild = {{ cmd = \"build.sh\", depends_on = \"setup\" }}\n"
        )))
        .expect("should validate");
        let tasks = manifest.tasks.expect("present");
        let Task::Table(table) = &tasks["build"] else {
            panic!("expected table task");
        };
        assert_eq!(table.cmd, Some(CommandList::One("build.sh".to_owned())));
        assert_eq!(
            table.depends_on,
            Some(CommandList::One("setup".to_owned()))
        );
    }

    #[test]
    fn channel_accepts_both_bare_string_and_table() {
        let manifest = validate_document(&document(
            r#"
[project]
name = "demo"
platforms = ["linux-64"]
channels = ["conda-forge", { channel = "pytorch", priority = 1 }]
"#,
        ))
        .expect("should validate");
        let channels = manifest.project.channels.expect("present");
        assert_eq!(channels[0], Channel::Name("conda-forge".to_owned()));
        assert_eq!(
            channels[1],
            Channel::Table(ChannelTable {
                channel: "pytorch".to_owned(),
                priority: Some(1),
            })
        );
    }

    #[test]
    fn bare_task_string_and_full_table_both_validate() {
        let manifest = validate_document(&document(&format!(
            "{MINIMAL}\n[tasks]\nfmt = \"cargo fmt\"\ntest = {{ cmd = [\"cargo\", \"test\"], cwd = \"crates\" }}\n"
        )))
        .expect("should validate");
        let tasks = manifest.tasks.expect("present");
        assert_eq!(tasks["fmt"], Task::Command("cargo fmt".to_owned()));
        let Task::Table(table) = &tasks["test"] else {
            panic!("expected table task");
        };
        assert_eq!(
            table.cmd,
            Some(CommandList::Many(vec![
                "cargo".to_owned(),
                "test".to_owned()
            ]))
        );
        assert_eq!(table.cwd.as_deref(), Some("crates"));
    }

    #[test]
    fn task_with_backslash_cwd_is_rejected() {
        let vs = violations(&format!(
            "{MINIMAL}\n[tasks]\nbuild = {{ cmd = \"build.sh\", cwd = \"scripts\\\\win\" }}\n"
        ));
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].kind, ViolationKind::ShapeMismatch);
        assert_eq!(vs[0].path.to_string(), "tasks.build");
    }

    #[test]
    fn shape_mismatch_names_every_attempted_alternative() {
        let vs = violations(&format!("{MINIMAL}\n[tasks]\nbuild = 42\n"));
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].kind, ViolationKind::ShapeMismatch);
        assert!(vs[0].message.contains("task table"));
        assert!(vs[0].message.contains("command string"));
    }

    #[test]
    fn environment_accepts_table_and_bare_feature_list() {
        let manifest = validate_document(&document(&format!(
            "{MINIMAL}\n[environments]\ndefault = [\"py39\"]\nlint = {{ features = [\"lint\"], solve-group = \"dev\" }}\n"
        )))
        .expect("should validate");
        let environments = manifest.environments.expect("present");
        assert_eq!(
            environments["default"],
            Environment::Features(vec!["py39".to_owned()])
        );
        assert_eq!(
            environments["lint"],
            Environment::Table(EnvironmentTable {
                features: Some(vec!["lint".to_owned()]),
                solve_group: Some("dev".to_owned()),
            })
        );
    }

    #[test]
    fn environment_solve_group_underscore_spelling_is_rejected() {
        let vs = violations(&format!(
            "{MINIMAL}\n[environments]\nlint = {{ solve_group = \"dev\" }}\n"
        ));
        assert_eq!(vs.len(), 1);
        // The table alternative rejects the unknown key, the list
        // alternative rejects the type; the aggregate is a shape mismatch.
        assert_eq!(vs[0].kind, ViolationKind::ShapeMismatch);
        assert!(vs[0].message.contains("solve_group"));
    }

    #[test]
    fn system_requirements_polymorphic_fields_resolve() {
        let manifest = validate_document(&document(&format!(
            "{MINIMAL}\n[system-requirements]\nlinux = 5.10\nunix = true\ncuda = \"11.8\"\nlibc = {{ family = \"glibc\", version = 2.27 }}\n"
        )))
        .expect("should validate");
        let reqs = manifest.system_requirements.expect("present");
        assert_eq!(reqs.linux, Some(VersionSpec::Number(5.10)));
        assert_eq!(reqs.unix, Some(UnixSpec::Enabled(true)));
        assert_eq!(reqs.cuda, Some(VersionSpec::Text("11.8".to_owned())));
        assert_eq!(
            reqs.libc,
            Some(LibcRequirement::Family(LibcFamily {
                family: Some("glibc".to_owned()),
                version: Some(VersionSpec::Number(2.27)),
            }))
        );
    }

    #[test]
    fn negative_linux_kernel_version_fails_both_shapes() {
        let vs = violations(&format!(
            "{MINIMAL}\n[system-requirements]\nlinux = -1.0\n"
        ));
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].kind, ViolationKind::ShapeMismatch);
        assert_eq!(vs[0].path.to_string(), "system-requirements.linux");
    }

    #[test]
    fn feature_composes_targets_and_system_requirements() {
        let manifest = validate_document(&document(&format!(
            r#"{MINIMAL}
[feature.cuda]
channels = ["nvidia"]
platforms = ["linux-64"]

[feature.cuda.dependencies]
cudatoolkit = "11.8"

[feature.cuda.system-requirements]
cuda = 11.8

[feature.cuda.target.linux-64.dependencies]
mkl = "2023"

[feature.cuda.target.linux-64.tasks]
warmup = "python warmup.py"
"#
        )))
        .expect("should validate");
        let features = manifest.feature.expect("present");
        let cuda = &features["cuda"];
        assert_eq!(cuda.platforms, Some(vec!["linux-64".to_owned()]));
        let targets = cuda.target.as_ref().expect("present");
        let linux = &targets["linux-64"];
        assert_eq!(
            linux.dependencies.as_ref().expect("present")["mkl"],
            MatchSpec::Version("2023".to_owned())
        );
        assert_eq!(
            linux.tasks.as_ref().expect("present")["warmup"],
            Task::Command("python warmup.py".to_owned())
        );
    }

    #[test]
    fn pypi_dependencies_accept_string_and_table_forms() {
        let manifest = validate_document(&document(&format!(
            "{MINIMAL}\n[pypi-dependencies]\nrequests = \">=2.28\"\nblack = {{ version = \"~=23.0\", extras = [\"jupyter\"] }}\n"
        )))
        .expect("should validate");
        let deps = manifest.pypi_dependencies.expect("present");
        assert_eq!(
            deps["requests"],
            PyPiRequirement::Version(">=2.28".to_owned())
        );
        assert_eq!(
            deps["black"],
            PyPiRequirement::Table(PyPiRequirementTable {
                version: Some("~=23.0".to_owned()),
                extras: Some(vec!["jupyter".to_owned()]),
            })
        );
    }

    #[test]
    fn dependency_match_spec_table_form_validates() {
        let manifest = validate_document(&document(&format!(
            "{MINIMAL}\n[dependencies]\npython = {{ version = \"3.11.*\", build = \"h*\", channel = \"conda-forge\" }}\n"
        )))
        .expect("should validate");
        let deps = manifest.dependencies.expect("present");
        assert_eq!(
            deps["python"],
            MatchSpec::Table(MatchSpecTable {
                version: Some("3.11.*".to_owned()),
                build: Some("h*".to_owned()),
                channel: Some("conda-forge".to_owned()),
            })
        );
    }

    #[test]
    fn project_url_fields_are_validated() {
        let vs = violations(
            r#"
[project]
name = "demo"
platforms = ["linux-64"]
homepage = "not a url"
"#,
        );
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].kind, ViolationKind::ConstraintViolation);
        assert_eq!(vs[0].path.to_string(), "project.homepage");
    }

    #[test]
    fn violation_paths_reach_into_lists() {
        let vs = violations(
            r#"
[project]
name = "demo"
platforms = ["linux-64", ""]
"#,
        );
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].path.to_string(), "project.platforms[1]");
    }

    #[test]
    fn non_table_document_is_a_type_mismatch() {
        let vs =
            validate_document(&Value::String("not a manifest".to_owned())).expect_err("fails");
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].kind, ViolationKind::TypeMismatch);
        assert_eq!(vs[0].path.to_string(), "(root)");
    }

    #[test]
    fn parse_manifest_str_wraps_syntax_errors() {
        let err = parse_manifest_str("project = [").expect_err("syntax error");
        assert!(matches!(err, ManifestError::ParseToml(_)));
    }

    #[test]
    fn parse_manifest_str_wraps_violations() {
        let err = parse_manifest_str("[project]\n").expect_err("invalid");
        let ManifestError::Invalid(vs) = err else {
            panic!("expected Invalid, got {err}");
        };
        assert!(!vs.is_empty());
    }

    #[test]
    fn valid_manifest_round_trips_through_its_document_form() {
        let manifest = validate_document(&document(&format!(
            r#"{MINIMAL}
[dependencies]
python = "3.11"
numpy = {{ version = ">=1.21", channel = "conda-forge" }}

[tasks]
fmt = "cargo fmt"
test = {{ cmd = ["pytest", "-x"], depends_on = "fmt" }}

[system-requirements]
linux = 5.10
libc = {{ family = "glibc", version = "2.27" }}

[environments]
default = ["base"]

[feature.base.dependencies]
pip = "*"

[target.linux-64.dependencies]
mkl = "2023"

[activation]
scripts = ["activate.sh"]
"#
        )))
        .expect("should validate");
        let rendered = manifest.to_document().expect("serializes");
        let revalidated = validate_document(&rendered).expect("round-trips");
        assert_eq!(revalidated, manifest);
    }
}
