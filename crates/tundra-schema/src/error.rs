//! Violation taxonomy and the library-level error type.

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// One segment of a path from the document root to a field or element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A mapping key (field name, package name, task name, ...).
    Key(String),
    /// A position inside an ordered list.
    Index(usize),
}

/// Path from the document root to the location a violation refers to.
///
/// Renders as `project.channels[1]` style dotted/indexed notation; the
/// empty path renders as `(root)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Extend the path with a mapping key.
    pub fn key(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(name.to_owned()));
        Self(segments)
    }

    /// Extend the path with a list index.
    pub fn index(&self, position: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(position));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Index(position) => write!(f, "[{position}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The five ways an input document can fail the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// A required field is absent.
    MissingField,
    /// A key is present that the entity does not declare.
    UnknownField,
    /// A scalar fails a pattern/range constraint.
    ConstraintViolation,
    /// A polymorphic value matches none of its declared shapes.
    ShapeMismatch,
    /// The structural kind (table vs list vs scalar) is wrong.
    TypeMismatch,
}

/// A single validation failure with its location and a human message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: FieldPath,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(path: FieldPath, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("manifest failed validation with {} violation(s)", .0.len())]
    Invalid(Vec<Violation>),
}
