//! Error types for command declaration, registration and dispatch.

use thiserror::Error;

use crate::command::OptionType;

/// Errors raised while building, registering or dispatching commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A command, group, option or choice name failed validation.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A description failed validation.
    #[error("Invalid description for '{name}': {reason}")]
    InvalidDescription { name: String, reason: String },

    /// An option declaration is malformed (e.g. extra of the wrong kind).
    #[error("Invalid option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    /// Two leaf commands resolve to the same routing key.
    #[error("Duplicate command definition detected: {0}")]
    DuplicateCommand(String),

    /// An option schema entry has a type with no accessor.
    #[error("Unsupported option type: {0}")]
    UnsupportedOptionType(OptionType),

    /// A guard called `next` more than once.
    #[error("next() called multiple times in guard at index {guard_index}")]
    DoubleInvocation { guard_index: usize },

    /// A required option is absent from the interaction payload.
    #[error("Missing required option: {0}")]
    MissingRequiredOption(String),

    /// The raw payload carries a value of a different type than requested.
    #[error("Option '{name}' is not of type {expected}")]
    OptionTypeMismatch { name: String, expected: OptionType },

    /// The payload references an entity that is not in its resolved data.
    #[error("Option '{name}' references unresolved entity {id}")]
    UnresolvedEntity { name: String, id: String },

    /// The tree nests deeper than the platform accepts.
    #[error("Command nesting too deep at '{0}'")]
    NestingTooDeep(String),

    /// A dispatch exceeded the configured timeout.
    #[error("Dispatch timed out after {0}ms")]
    Timeout(u64),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON payload.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error returned by application code (handlers, guards, event handlers).
    #[error(transparent)]
    Handler(#[from] anyhow::Error),

    /// Generic error.
    #[error("Command error: {0}")]
    Other(String),
}

/// Result type for command operations.
pub type CommandResult<T> = Result<T, CommandError>;
