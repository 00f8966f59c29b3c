//! Static entity and field descriptor tables.
//!
//! These tables are the single source of truth for the manifest contract:
//! the validator reads field names (external, hyphenated spellings),
//! required flags, and closed-world key sets from them, and the schema
//! generator walks them to produce the JSON Schema artifact. Declaration
//! order here is the order fields and definitions appear in generated
//! output.

/// Declarative type shape of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A string of length >= 1.
    NonEmptyStr,
    /// A non-empty string without backslashes.
    PathNoBackslash,
    /// An absolute http(s) URL.
    Url,
    /// A plain signed integer.
    Int,
    /// A float > 0.
    PositiveFloat,
    /// Any float.
    Float,
    Bool,
    List(&'static Shape),
    /// A mapping from non-empty string keys to the element shape.
    Map(&'static Shape),
    /// A reference to a named entity definition.
    Entity(&'static str),
    /// Ordered polymorphic alternatives; resolution tries them in order.
    AnyOf(&'static [Shape]),
}

/// One declared field of an entity: external spelling, required flag,
/// shape, and documentation carried into the schema artifact.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub required: bool,
    pub shape: Shape,
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

impl FieldDef {
    const fn required(name: &'static str, shape: Shape, description: &'static str) -> Self {
        Self {
            name,
            required: true,
            shape,
            description,
            examples: &[],
        }
    }

    const fn optional(name: &'static str, shape: Shape, description: &'static str) -> Self {
        Self {
            name,
            required: false,
            shape,
            description,
            examples: &[],
        }
    }

    const fn examples(mut self, examples: &'static [&'static str]) -> Self {
        self.examples = examples;
        self
    }
}

/// A closed-world entity: its name, documentation, and declared fields.
#[derive(Debug, Clone, Copy)]
pub struct EntityDef {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldDef],
}

impl EntityDef {
    /// Look up a declared field by its external spelling.
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `name` is a declared field of this entity.
    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

// Reusable shapes. Alternative order matters: the validator tries them
// in the declared order and the first structural match wins.
const NON_EMPTY: Shape = Shape::NonEmptyStr;
const STRING_LIST: Shape = Shape::List(&NON_EMPTY);
const CHANNEL: Shape = Shape::AnyOf(&[Shape::NonEmptyStr, Shape::Entity("ChannelTable")]);
const CHANNEL_LIST: Shape = Shape::List(&CHANNEL);
const MATCH_SPEC: Shape = Shape::AnyOf(&[Shape::NonEmptyStr, Shape::Entity("MatchSpecTable")]);
const DEPENDENCIES: Shape = Shape::Map(&MATCH_SPEC);
const PYPI_REQUIREMENT: Shape =
    Shape::AnyOf(&[Shape::NonEmptyStr, Shape::Entity("PyPiRequirementTable")]);
const PYPI_DEPENDENCIES: Shape = Shape::Map(&PYPI_REQUIREMENT);
const TASK: Shape = Shape::AnyOf(&[Shape::Entity("TaskTable"), Shape::NonEmptyStr]);
const TASKS: Shape = Shape::Map(&TASK);
const COMMAND_OR_LIST: Shape = Shape::AnyOf(&[STRING_LIST, Shape::NonEmptyStr]);
const TARGET_REF: Shape = Shape::Entity("Target");
const TARGETS: Shape = Shape::Map(&TARGET_REF);
const FEATURE_REF: Shape = Shape::Entity("Feature");
const FEATURES: Shape = Shape::Map(&FEATURE_REF);
const ENVIRONMENT_VALUE: Shape = Shape::AnyOf(&[Shape::Entity("Environment"), STRING_LIST]);
const ENVIRONMENTS: Shape = Shape::Map(&ENVIRONMENT_VALUE);
const POSITIVE_VERSION: Shape = Shape::AnyOf(&[Shape::PositiveFloat, Shape::NonEmptyStr]);
const ANY_VERSION: Shape = Shape::AnyOf(&[Shape::Float, Shape::NonEmptyStr]);
const BOOL_OR_STR: Shape = Shape::AnyOf(&[Shape::Bool, Shape::NonEmptyStr]);
const LIBC: Shape = Shape::AnyOf(&[Shape::Entity("LibcFamily"), Shape::Float, Shape::NonEmptyStr]);

const TARGET_EXAMPLE: &[&str] = &[r#"{"linux": {"dependencies": {"python": "3.8"}}}"#];

pub const CHANNEL_TABLE: EntityDef = EntityDef {
    name: "ChannelTable",
    description: "A channel with an explicit priority",
    fields: &[
        FieldDef::required(
            "channel",
            Shape::AnyOf(&[Shape::NonEmptyStr, Shape::Url]),
            "The channel the packages needs to be fetched from",
        ),
        FieldDef::optional("priority", Shape::Int, "The priority of the channel"),
    ],
};

pub const PROJECT: EntityDef = EntityDef {
    name: "Project",
    description: "The project's metadata information",
    fields: &[
        FieldDef::required(
            "name",
            Shape::NonEmptyStr,
            "The name of the project, we advise to use the name of the repository",
        ),
        FieldDef::optional(
            "version",
            Shape::NonEmptyStr,
            "The version of the project, we advise to use semver",
        )
        .examples(&["1.2.3"]),
        FieldDef::optional(
            "description",
            Shape::NonEmptyStr,
            "A short description of the project",
        ),
        FieldDef::optional("authors", STRING_LIST, "The authors of the project")
            .examples(&["John Doe <j.doe@prefix.dev>"]),
        FieldDef::optional(
            "channels",
            CHANNEL_LIST,
            "The conda channels that can be used in the project",
        ),
        FieldDef::required(
            "platforms",
            STRING_LIST,
            "The platforms that the project supports",
        ),
        FieldDef::optional("license", Shape::NonEmptyStr, "The license of the project"),
        FieldDef::optional(
            "license_file",
            Shape::PathNoBackslash,
            "The path to the license file of the project",
        ),
        FieldDef::optional(
            "readme",
            Shape::PathNoBackslash,
            "The path to the readme file of the project",
        ),
        FieldDef::optional(
            "homepage",
            Shape::Url,
            "The url of the homepage of the project",
        ),
        FieldDef::optional(
            "repository",
            Shape::Url,
            "The url of the repository of the project",
        ),
        FieldDef::optional(
            "documentation",
            Shape::Url,
            "The url of the documentation of the project",
        ),
    ],
};

pub const MATCH_SPEC_TABLE: EntityDef = EntityDef {
    name: "MatchSpecTable",
    description: "A requirement on a conda package, split into its parts",
    fields: &[
        FieldDef::optional(
            "version",
            Shape::NonEmptyStr,
            "The version of the package in MatchSpec format",
        ),
        FieldDef::optional(
            "build",
            Shape::NonEmptyStr,
            "The build string of the package",
        ),
        FieldDef::optional(
            "channel",
            Shape::NonEmptyStr,
            "The channel the packages needs to be fetched from",
        )
        .examples(&[
            "conda-forge",
            "pytorch",
            "https://repo.prefix.dev/conda-forge",
        ]),
    ],
};

pub const PYPI_REQUIREMENT_TABLE: EntityDef = EntityDef {
    name: "PyPiRequirementTable",
    description: "A requirement on a PyPI package, split into its parts",
    fields: &[
        FieldDef::optional(
            "version",
            Shape::NonEmptyStr,
            "The version of the package in PEP 440 format",
        ),
        FieldDef::optional("extras", STRING_LIST, "The extras of the package"),
    ],
};

pub const TASK_TABLE: EntityDef = EntityDef {
    name: "TaskTable",
    description: "A task with its command, working directory, and dependencies",
    fields: &[
        FieldDef::optional("cmd", COMMAND_OR_LIST, "The command to run the task"),
        FieldDef::optional(
            "cwd",
            Shape::PathNoBackslash,
            "The working directory to run the task",
        ),
        FieldDef::optional(
            "depends_on",
            COMMAND_OR_LIST,
            "The tasks that this task depends on",
        ),
    ],
};

pub const LIBC_FAMILY: EntityDef = EntityDef {
    name: "LibcFamily",
    description: "The libc family and version",
    fields: &[
        FieldDef::optional("family", Shape::NonEmptyStr, "The family of the libc")
            .examples(&["glibc", "musl"]),
        FieldDef::optional("version", ANY_VERSION, "The version of libc"),
    ],
};

pub const SYSTEM_REQUIREMENTS: EntityDef = EntityDef {
    name: "SystemRequirements",
    description: "The system requirements of the project",
    fields: &[
        FieldDef::optional(
            "linux",
            POSITIVE_VERSION,
            "The minimum version of the linux kernel",
        ),
        FieldDef::optional("unix", BOOL_OR_STR, "Whether the project supports unix")
            .examples(&["true"]),
        FieldDef::optional("libc", LIBC, "The minimum version of glibc"),
        FieldDef::optional("cuda", ANY_VERSION, "The minimum version of cuda"),
        FieldDef::optional(
            "archspec",
            Shape::NonEmptyStr,
            "The architecture the project supports",
        ),
        FieldDef::optional(
            "macos",
            POSITIVE_VERSION,
            "The minimum version of macos",
        ),
    ],
};

pub const ENVIRONMENT: EntityDef = EntityDef {
    name: "Environment",
    description: "A composition of features that should be solved together",
    fields: &[
        FieldDef::optional(
            "features",
            STRING_LIST,
            "The features that define the environment",
        ),
        FieldDef::optional(
            "solve-group",
            Shape::NonEmptyStr,
            "The group name for environments that should be solved together",
        ),
    ],
};

pub const ACTIVATION: EntityDef = EntityDef {
    name: "Activation",
    description: "The scripts used on the activation of the project",
    fields: &[FieldDef::optional(
        "scripts",
        STRING_LIST,
        "The scripts to run when the environment is activated",
    )
    .examples(&["activate.sh", "activate.bat"])],
};

pub const TARGET: EntityDef = EntityDef {
    name: "Target",
    description: "A platform-specific bundle of dependencies, tasks, and activation",
    fields: &[
        FieldDef::optional(
            "dependencies",
            DEPENDENCIES,
            "The conda dependencies, consisting of a package name and a requirement in MatchSpec format",
        ),
        FieldDef::optional(
            "host-dependencies",
            DEPENDENCIES,
            "The host conda dependencies, used in the build process",
        ),
        FieldDef::optional(
            "build-dependencies",
            DEPENDENCIES,
            "The build conda dependencies, used in the build process",
        ),
        FieldDef::optional("pypi-dependencies", PYPI_DEPENDENCIES, "The pypi dependencies"),
        FieldDef::optional("tasks", TASKS, "The tasks of the project"),
        FieldDef::optional(
            "activation",
            Shape::Entity("Activation"),
            "The scripts used on the activation of the project",
        ),
    ],
};

pub const FEATURE: EntityDef = EntityDef {
    name: "Feature",
    description: "A named bundle of dependencies, tasks, and platform data that can be composed into environments",
    fields: &[
        FieldDef::optional(
            "channels",
            CHANNEL_LIST,
            "The conda channels that can be used in the feature",
        ),
        FieldDef::optional(
            "platforms",
            STRING_LIST,
            "The platforms that the feature supports; the union of all features combined in one environment is used for the environment",
        ),
        FieldDef::optional(
            "dependencies",
            DEPENDENCIES,
            "The conda dependencies, consisting of a package name and a requirement in MatchSpec format",
        ),
        FieldDef::optional(
            "host-dependencies",
            DEPENDENCIES,
            "The host conda dependencies, used in the build process",
        ),
        FieldDef::optional(
            "build-dependencies",
            DEPENDENCIES,
            "The build conda dependencies, used in the build process",
        ),
        FieldDef::optional("pypi-dependencies", PYPI_DEPENDENCIES, "The pypi dependencies"),
        FieldDef::optional("tasks", TASKS, "The tasks of the project"),
        FieldDef::optional(
            "activation",
            Shape::Entity("Activation"),
            "The scripts used on the activation of the project",
        ),
        FieldDef::optional(
            "system-requirements",
            Shape::Entity("SystemRequirements"),
            "The system requirements of the project",
        ),
        FieldDef::optional("target", TARGETS, "The targets of the project").examples(TARGET_EXAMPLE),
    ],
};

pub const MANIFEST: EntityDef = EntityDef {
    name: "Manifest",
    description: "The configuration for a Tundra project",
    fields: &[
        FieldDef::required(
            "project",
            Shape::Entity("Project"),
            "The project's metadata information",
        ),
        FieldDef::optional(
            "dependencies",
            DEPENDENCIES,
            "The conda dependencies, consisting of a package name and a requirement in MatchSpec format",
        ),
        FieldDef::optional(
            "host-dependencies",
            DEPENDENCIES,
            "The host conda dependencies, used in the build process",
        ),
        FieldDef::optional(
            "build-dependencies",
            DEPENDENCIES,
            "The build conda dependencies, used in the build process",
        ),
        FieldDef::optional("pypi-dependencies", PYPI_DEPENDENCIES, "The pypi dependencies"),
        FieldDef::optional("tasks", TASKS, "The tasks of the project"),
        FieldDef::optional(
            "system-requirements",
            Shape::Entity("SystemRequirements"),
            "The system requirements of the project",
        ),
        FieldDef::optional(
            "environments",
            ENVIRONMENTS,
            "The environments of the project",
        ),
        FieldDef::optional("feature", FEATURES, "The features of the project"),
        FieldDef::optional(
            "activation",
            Shape::Entity("Activation"),
            "The scripts used on the activation of the project",
        ),
        FieldDef::optional("target", TARGETS, "The targets of the project").examples(TARGET_EXAMPLE),
    ],
};

/// Every referenced entity definition, in declaration order. The schema
/// generator emits these as the `definitions` section.
pub const DEFINITIONS: &[&EntityDef] = &[
    &CHANNEL_TABLE,
    &PROJECT,
    &MATCH_SPEC_TABLE,
    &PYPI_REQUIREMENT_TABLE,
    &TASK_TABLE,
    &LIBC_FAMILY,
    &SYSTEM_REQUIREMENTS,
    &ENVIRONMENT,
    &ACTIVATION,
    &TARGET,
    &FEATURE,
];

/// Look up an entity definition by name.
pub fn definition(name: &str) -> Option<&'static EntityDef> {
    DEFINITIONS.iter().copied().find(|e| e.name == name)
}
