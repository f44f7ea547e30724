//! Error types for the repeater engine

use thiserror::Error;

/// Main error type for repeater engine operations
#[derive(Debug, Error, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum RepeaterError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Malformed request: {reason}")]
    MalformedRequest { reason: String },

    #[error("Network error: {message}")]
    Network { message: String, trace: String },

    #[error("Shortcut {chord} is already bound to {action}")]
    ShortcutConflict { action: String, chord: String },

    #[error("Persistence failed: {operation} - {details}")]
    Persistence { operation: String, details: String },

    #[error("Serialization error: {error}")]
    Serialization { error: String },

    #[error("Logging setup failed: {reason}")]
    Logging { reason: String },

    #[error("Input validation failed: {field} - {reason}")]
    Validation { field: String, reason: String },
}

impl RepeaterError {
    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: &str, reason: impl ToString) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a malformed request error
    pub fn malformed_request(reason: &str) -> Self {
        Self::MalformedRequest {
            reason: reason.to_string(),
        }
    }

    /// Create a network error carrying the failure message and its trace
    pub fn network(message: &str, trace: &str) -> Self {
        Self::Network {
            message: message.to_string(),
            trace: trace.to_string(),
        }
    }

    /// Create a validation error with field and reason
    pub fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a persistence error
    pub fn persistence(operation: &str, details: impl ToString) -> Self {
        Self::Persistence {
            operation: operation.to_string(),
            details: details.to_string(),
        }
    }

    /// Check if the error is recoverable (the user can simply retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            RepeaterError::Network { .. } => true,
            RepeaterError::Persistence { .. } => true,

            RepeaterError::InvalidPattern { .. } => false,
            RepeaterError::MalformedRequest { .. } => false,
            RepeaterError::ShortcutConflict { .. } => false,
            RepeaterError::Serialization { .. } => false,
            RepeaterError::Logging { .. } => false,
            RepeaterError::Validation { .. } => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RepeaterError::Persistence { .. } => ErrorSeverity::High,
            RepeaterError::Logging { .. } => ErrorSeverity::High,
            RepeaterError::Serialization { .. } => ErrorSeverity::Medium,
            RepeaterError::Network { .. } => ErrorSeverity::Medium,
            RepeaterError::InvalidPattern { .. } => ErrorSeverity::Low,
            RepeaterError::MalformedRequest { .. } => ErrorSeverity::Low,
            RepeaterError::ShortcutConflict { .. } => ErrorSeverity::Low,
            RepeaterError::Validation { .. } => ErrorSeverity::Low,
        }
    }

    /// Text shown in the response area when this error ends a send
    pub fn display_body(&self) -> String {
        match self {
            RepeaterError::Network { message, trace } if !trace.is_empty() => {
                format!("Error: {}\n\n{}", message, trace)
            }
            RepeaterError::Network { message, .. } => format!("Error: {}", message),
            other => format!("Error: {}", other),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
}

impl From<serde_json::Error> for RepeaterError {
    fn from(error: serde_json::Error) -> Self {
        RepeaterError::Serialization {
            error: error.to_string(),
        }
    }
}

impl From<std::io::Error> for RepeaterError {
    fn from(error: std::io::Error) -> Self {
        RepeaterError::Persistence {
            operation: format!("{:?}", error.kind()),
            details: error.to_string(),
        }
    }
}

/// Result type for repeater engine operations
pub type RepeaterResult<T> = Result<T, RepeaterError>;
