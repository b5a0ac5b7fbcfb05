use std::fmt::{self, Display};

use thiserror::Error;

/// A validation failure attached to a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// What kind of entity an id referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    ActionItem,
    Resource,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::ActionItem => "action item",
            EntityKind::Resource => "resource",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("an action item named `{0}` already exists")]
    DuplicateName(String),

    #[error("{kind} `{id}` already exists")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("{kind} `{id}` not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("index {index} is out of range for a list of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("field `{0}` is not part of the active form branch")]
    InactiveField(String),

    #[error("field `{field}` expects {expected}")]
    TypeMismatch { field: String, expected: &'static str },

    #[error("`{value}` is not a valid option for `{field}`")]
    InvalidOption { field: String, value: String },

    #[error("malformed {resource_type} configuration: {reason}")]
    MalformedConfig { resource_type: String, reason: String },

    #[error("no resource is being edited")]
    NoActiveSession,

    #[error("no action item is selected")]
    NoActiveActionItem,

    #[error("action item `{0}` has no resource selected")]
    NoResourceSelected(String),

    #[error("resource `{id}` is a {from} resource and cannot become {to}")]
    ResourceTypeChanged { id: String, from: String, to: String },
}

impl EditorError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        EditorError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Field errors carried by a validation failure, empty for every other variant.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            EditorError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, EditorError>;
