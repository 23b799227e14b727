//! Error types for backend operations.
//!
//! This module provides error handling for all calls to the remote schedule
//! service, with structured context for debugging and monitoring.

use std::fmt;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Structured context for backend errors.
///
/// Provides additional information about where and why an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "save_slot", "fetch_section_schedule")
    pub operation: Option<String>,
    /// The entity type involved (e.g., "slot", "section_subject")
    pub entity: Option<String>,
    /// The entity ID if applicable
    pub entity_id: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
    /// Whether this error is retryable
    pub retryable: bool,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the entity type.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set the entity ID.
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Mark this error as retryable.
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for backend operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport-level failure reaching the backend.
    /// These are typically transient and may be retried.
    #[error("Network error: {message} {context}")]
    Network {
        message: String,
        context: ErrorContext,
    },

    /// The backend did not answer within the allotted time.
    #[error("Timeout error: {message} {context}")]
    Timeout {
        message: String,
        context: ErrorContext,
    },

    /// Requested entity was not found. On a slot write this is the
    /// stale-data case: the target was deleted by another session.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// The backend rejected the request payload.
    #[error("Validation error: {message} {context}")]
    Validation {
        message: String,
        context: ErrorContext,
    },

    /// Configuration or initialization error.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// Internal/unexpected errors.
    #[error("Internal error: {message} {context}")]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl BackendError {
    /// Create a network error with context.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    /// Create a network error with full context.
    pub fn network_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Network {
            message: message.into(),
            context: context.retryable(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a not found error with context.
    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { context, .. } => context.retryable,
            Self::Timeout { context, .. } => context.retryable,
            _ => false,
        }
    }

    /// Whether this error is a transport-level failure (network or timeout),
    /// as opposed to a definitive answer from the backend.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Network { context, .. } => context,
            Self::Timeout { context, .. } => context,
            Self::NotFound { context, .. } => context,
            Self::Validation { context, .. } => context,
            Self::Configuration { context, .. } => context,
            Self::Internal { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        match &mut self {
            Self::Network { context, .. }
            | Self::Timeout { context, .. }
            | Self::NotFound { context, .. }
            | Self::Validation { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => {
                context.operation = Some(operation.into());
            }
        }
        self
    }
}

#[cfg(feature = "rest-backend")]
impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        let context = ErrorContext::default().with_details(
            err.url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "no url".to_string()),
        );
        if err.is_timeout() {
            BackendError::Timeout {
                message: err.to_string(),
                context: context.retryable(),
            }
        } else if err.is_connect() || err.is_request() {
            BackendError::Network {
                message: err.to_string(),
                context: context.retryable(),
            }
        } else if err.status() == Some(reqwest::StatusCode::NOT_FOUND) {
            BackendError::NotFound {
                message: err.to_string(),
                context,
            }
        } else if err
            .status()
            .map(|s| s.is_client_error())
            .unwrap_or(false)
        {
            BackendError::Validation {
                message: err.to_string(),
                context,
            }
        } else {
            BackendError::Internal {
                message: err.to_string(),
                context,
            }
        }
    }
}
