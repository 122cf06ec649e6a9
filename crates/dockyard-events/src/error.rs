// ABOUTME: Error types for the message bus, handlers and event emitters
// ABOUTME: Handler errors are contained by the bus; only argument and lifecycle errors reach callers

/// Errors returned to callers of the message bus
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Message bus has been disposed")]
    Disposed,
}

/// Failure reported by a subscriber's handler.
///
/// The bus logs these and keeps delivering to other recipients.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Handler failed to process message: {message}")]
    ProcessingFailed { message: String },

    #[error("Handler internal error: {source}")]
    Internal {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::ProcessingFailed {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitterError {
    #[error("Consumer '{consumer_id}' is already attached")]
    AlreadyAttached { consumer_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            BusError::InvalidArgument("recipient_id is empty".into()).to_string(),
            "Invalid argument: recipient_id is empty"
        );
        assert_eq!(
            HandlerError::failed("bad payload").to_string(),
            "Handler failed to process message: bad payload"
        );

        let io = std::io::Error::other("disk gone");
        let internal = HandlerError::Internal {
            source: Box::new(io),
        };
        assert!(internal.to_string().contains("disk gone"));
    }
}
