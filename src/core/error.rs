//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A configuration token that is neither a level, a flag nor a single `key=level` pair
    #[error("line: '{token}' is formatted incorrectly, expected `level` or `module=level`")]
    MalformedConfig { token: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// The process-wide runtime was installed twice
    #[error("Global logging runtime is already initialized")]
    AlreadyInitialized,

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// HTTP control plane failed to start or serve
    #[error("Control plane error: {0}")]
    ControlPlane(String),
}

impl LoggerError {
    /// Create a malformed configuration token error
    pub fn malformed(token: impl Into<String>) -> Self {
        LoggerError::MalformedConfig {
            token: token.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// True for errors produced while parsing a configuration string
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            LoggerError::MalformedConfig { .. } | LoggerError::InvalidConfiguration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::malformed("a=b=c");
        assert!(matches!(err, LoggerError::MalformedConfig { .. }));
        assert!(err.is_config_error());

        let err = LoggerError::config("FileAppender", "Invalid path");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        assert!(!LoggerError::AlreadyInitialized.is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::malformed("moduleA=debug=extra");
        assert_eq!(
            err.to_string(),
            "line: 'moduleA=debug=extra' is formatted incorrectly, expected `level` or `module=level`"
        );

        let err = LoggerError::ControlPlane("cannot bind port 11111: in use".to_string());
        assert_eq!(
            err.to_string(),
            "Control plane error: cannot bind port 11111: in use"
        );
    }
}
