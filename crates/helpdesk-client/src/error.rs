//! Normalized error types for support backend operations.
//!
//! Transport-agnostic errors that hide wire details and give callers a
//! human-readable message to surface in a notification.

/// Normalized error for support backend operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Mailbox or conversation not found by slug.
    #[error("{entity} {slug:?} not found")]
    NotFound { entity: &'static str, slug: String },

    /// Request validation failed (missing slug, bad parameters).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The session is missing or expired.
    #[error("unauthorized")]
    Unauthorized,

    /// The backend is unreachable or the request timed out.
    #[error("backend unavailable: {message}")]
    TransportUnavailable { message: String },

    /// The backend rejected the request with a user-facing message.
    #[error("{message}")]
    Rejected { message: String },

    /// An unexpected failure with no user-facing message.
    #[error("internal error")]
    Internal,
}

impl BackendError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Message suitable for a notification title, if the failure carries one.
    pub fn message(&self) -> Option<String> {
        let message = match self {
            Self::Internal => return None,
            Self::Rejected { message } => message.clone(),
            other => other.to_string(),
        };
        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BackendError;

    #[test]
    fn rejected_message_is_passed_through() {
        let err = BackendError::rejected("Slack channel not found");
        assert_eq!(err.message().as_deref(), Some("Slack channel not found"));
        assert_eq!(err.to_string(), "Slack channel not found");
    }

    #[test]
    fn blank_and_internal_errors_carry_no_message() {
        assert_eq!(BackendError::rejected("  ").message(), None);
        assert_eq!(BackendError::Internal.message(), None);
    }
}
