//! Error types for taskchain

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for taskchain operations
pub type Result<T> = std::result::Result<T, TaskchainError>;

/// Main error type for taskchain
#[derive(Error, Debug)]
pub enum TaskchainError {
    /// Task directory errors
    #[error("Task store error: {0}")]
    Store(#[from] StoreError),

    /// Task document errors
    #[error("Task document error: {0}")]
    Document(#[from] DocumentError),

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// Condition evaluation errors
    #[error("Condition error: {0}")]
    Condition(#[from] ConditionError),

    /// Data store errors
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Definition wizard errors
    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

/// Errors raised while locating, listing or writing task files
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Task file path not provided")]
    MissingPath,

    #[error("Task file not found: '{0}'")]
    NotFound(String),

    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize task document: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Errors raised while reading and validating a task document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("YAML syntax error: {0}")]
    Syntax(String),

    #[error("Invalid task format: {0}")]
    Schema(String),
}

/// Variable interpolation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),
}

/// Per-condition failures; each one counts as an unmet condition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    #[error("Invalid model '{0}' (expected hosts, services, vulns or creds)")]
    InvalidModel(String),

    #[error("Invalid 'where' clause for '{model}': {error}")]
    MalformedFilter { model: String, error: String },
}

/// Data store errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Failed to load data store '{path}': {error}")]
    Load { path: PathBuf, error: String },

    #[error("{0}")]
    Filter(String),
}

/// Definition wizard errors
#[derive(Error, Debug)]
pub enum WizardError {
    #[error("No steps defined")]
    EmptyTask,

    #[error("No file name given")]
    MissingFilename,

    #[error("Failed to read input: {0}")]
    Prompt(#[from] io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Specialized result type for task store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Specialized result type for document parsing
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

/// Specialized result type for data store queries
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Specialized result type for the definition wizard
pub type WizardResult<T> = std::result::Result<T, WizardError>;
