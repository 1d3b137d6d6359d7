use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading rule definitions from disk
#[derive(Error, Debug)]
pub enum RuleLoadError {
    #[error("Rule file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid rule file format in {0}: expected an object or an array of objects")]
    InvalidFormat(String),

    #[error("Missing required field in rule definition: '{0}'")]
    MissingField(String),

    #[error("Invalid rule definition '{rule_name}': {}", errors.join("; "))]
    InvalidDefinition {
        rule_name: String,
        errors: Vec<String>,
    },

    #[error("Duplicate rule name: {0}")]
    DuplicateRule(String),

    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Failures raised by a regulation store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown regulation id: {0}")]
    UnknownRegulation(u64),

    #[error("Regulation store unavailable: {0}")]
    Unavailable(String),
}

/// Failures that abort a validation run
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Failed to fetch regulations: {0}")]
    Regulations(#[source] StoreError),

    #[error("Failed to fetch rules for regulation {regulation_code}: {source}")]
    Rules {
        regulation_code: String,
        #[source]
        source: StoreError,
    },
}

/// Evaluation failure inside a domain handler or the condition evaluator.
///
/// Never leaves the engine: dispatch turns it into a failing outcome.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct EvaluationError(pub String);

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
