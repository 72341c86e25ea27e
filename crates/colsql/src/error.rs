//! Error types for colsql

use thiserror::Error;

/// Result type alias for colsql operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Boxed error produced by a third-party driver.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for statement building, execution and row mapping
#[derive(Debug, Error)]
pub enum OrmError {
    /// Builder is missing required state (table, values or clauses).
    ///
    /// Always raised before anything is sent to the connection.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target value could not be constructed, or a strict mapper met an
    /// unmatched column.
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Value could not be bound to a statement parameter
    #[error("Bind error on parameter {index}: {message}")]
    Bind { index: usize, message: String },

    /// Error raised by a driver implementation, passed through untouched
    #[error(transparent)]
    Driver(DriverError),

    /// PostgreSQL error
    #[cfg(feature = "postgres")]
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),
}

impl OrmError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a mapping error
    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a bind error for a 1-based parameter index
    pub fn bind(index: usize, message: impl Into<String>) -> Self {
        Self::Bind {
            index,
            message: message.into(),
        }
    }

    /// Wrap an arbitrary driver error
    pub fn driver(err: impl Into<DriverError>) -> Self {
        Self::Driver(err.into())
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a mapping error
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    /// Check if this is a decode error
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            OrmError::config("No table defined").to_string(),
            "Configuration error: No table defined"
        );
        assert_eq!(
            OrmError::decode("age", "expected integer").to_string(),
            "Decode error on column 'age': expected integer"
        );
        assert_eq!(
            OrmError::bind(2, "out of range").to_string(),
            "Bind error on parameter 2: out of range"
        );
    }

    #[test]
    fn test_driver_error_is_transparent() {
        let io = std::io::Error::other("socket closed");
        let err = OrmError::driver(io);
        assert_eq!(err.to_string(), "socket closed");
        assert!(!err.is_config());
    }

    #[test]
    fn test_predicates() {
        assert!(OrmError::config("x").is_config());
        assert!(OrmError::mapping("x").is_mapping());
        assert!(OrmError::decode("c", "m").is_decode());
    }
}
