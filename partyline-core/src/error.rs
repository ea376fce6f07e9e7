// Error types for the partyline core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Routing misconfiguration: {0}")]
    RoutingMisconfiguration(String),

    #[error("Application already joined the partyline: {0}")]
    DuplicateHandshake(String),

    #[error("No partyline operator in request environ under key: {0}")]
    NotInvited(String),

    #[error("No such service name: {0}")]
    NoSuchServiceName(String),

    #[error("Handler for service '{service}' failed: {message}")]
    HandlerFailed { service: String, message: String },

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Get the status code a response for this error should carry
    pub fn status_code(&self) -> u16 {
        match self {
            // Handshake rejections look like a missing route to outside callers.
            Error::DuplicateHandshake(_) | Error::NotInvited(_) | Error::NotFound(_) => 404,
            Error::Deserialization(_) => 400,
            _ => 500,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

/// Error returned by a partyline handler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler has no answer for this payload ("high and dry").
    ///
    /// Fan-out loops swallow this signal; it never reaches the caller.
    #[error("Handler declined to answer")]
    Declined,

    /// Any other fault; propagated to the caller of the query.
    #[error("Handler failed: {0}")]
    Failed(String),
}

impl HandlerError {
    /// Shorthand for an ordinary handler fault
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_errors_map_to_not_found() {
        assert_eq!(Error::DuplicateHandshake("/one".into()).status_code(), 404);
        assert_eq!(Error::NotInvited("partyline".into()).status_code(), 404);
        assert!(Error::NotFound("/nope".into()).is_client_error());
    }

    #[test]
    fn test_server_errors() {
        let err = Error::HandlerFailed {
            service: "url".into(),
            message: "boom".into(),
        };
        assert_eq!(err.status_code(), 500);
        assert!(err.is_server_error());
        assert!(Error::NoSuchServiceName("ping".into()).is_server_error());
        assert_eq!(
            Error::RoutingMisconfiguration("dup".into()).to_string(),
            "Routing misconfiguration: dup"
        );
    }

    #[test]
    fn test_handler_error_display() {
        assert_eq!(HandlerError::failed("bad").to_string(), "Handler failed: bad");
        assert_eq!(
            HandlerError::Declined.to_string(),
            "Handler declined to answer"
        );
    }
}
