//! Error types for statement building, planning and execution

use crate::schema::IdentifierRole;
use crate::session::DriverError;
use thiserror::Error;

/// Result type for builder calls and other pure validation steps
pub type SchemaResult<T> = Result<T, ValidationError>;

/// Result type for planning and execution
pub type CqlResult<T> = Result<T, CqlError>;

/// Validation failures raised before any statement reaches a session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Identifier collides with a CQL reserved keyword
    #[error("The {role} name '{word}' is not allowed because it is a reserved keyword")]
    ReservedKeyword { role: IdentifierRole, word: String },

    /// Identifier is empty or whitespace
    #[error("The {role} name should not be blank")]
    BlankIdentifier { role: IdentifierRole },

    /// Schema definition is structurally invalid
    #[error("Invalid schema definition: {0}")]
    InvalidSchema(String),

    /// Slice bounds are incomparable, reversed or leave a hole
    #[error("Malformed slice range: {0}")]
    MalformedRange(String),

    /// Slice query arguments are invalid
    #[error("Invalid slice query: {0}")]
    InvalidQuery(String),
}

/// Errors surfaced by the query engine
#[derive(Debug, Error)]
pub enum CqlError {
    /// Validation error, always raised before I/O
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing or invalid configuration
    #[error("Configuration error: {message}{}", .key.as_ref().map(|k| format!(" (key: {})", k)).unwrap_or_default())]
    Configuration { message: String, key: Option<String> },

    /// Error returned by the driver session, passed through unmodified
    #[error(transparent)]
    Execution(#[from] DriverError),

    /// Row could not be decoded into an entity
    #[error("Mapping error for entity '{entity}': {message}")]
    Mapping { entity: String, message: String },

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(String),
}

impl CqlError {
    /// Configuration error bound to a configuration key
    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        CqlError::Configuration {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Row decoding error for the given entity
    pub fn mapping(entity: impl Into<String>, message: impl Into<String>) -> Self {
        CqlError::Mapping {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised before any statement was issued
    pub fn is_validation(&self) -> bool {
        matches!(self, CqlError::Validation(_) | CqlError::Configuration { .. })
    }
}

impl From<std::io::Error> for CqlError {
    fn from(err: std::io::Error) -> Self {
        CqlError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for CqlError {
    fn from(err: toml::de::Error) -> Self {
        CqlError::Configuration {
            message: err.to_string(),
            key: None,
        }
    }
}

impl From<toml::ser::Error> for CqlError {
    fn from(err: toml::ser::Error) -> Self {
        CqlError::Configuration {
            message: err.to_string(),
            key: None,
        }
    }
}
