use crate::error::{OrmError, OrmResult};

/// Environment variable holding the connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Environment variable naming [`PgConfig::generated_key_column`].
pub const GENERATED_KEY_ENV: &str = "COLSQL_GENERATED_KEY";

/// Configuration for [`PgConnection`](super::PgConnection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgConfig {
    /// libpq-style connection string or `postgres://` URL.
    pub url: String,
    /// Column returned as the generated key of an INSERT.
    ///
    /// `None` leaves INSERT statements untouched; they then report no key.
    pub generated_key_column: Option<String>,
}

impl PgConfig {
    /// Create a configuration for `url` with defaults.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            generated_key_column: None,
        }
    }

    /// Read `DATABASE_URL` (required) and `COLSQL_GENERATED_KEY` (optional).
    pub fn from_env() -> OrmResult<Self> {
        let url = std::env::var(DATABASE_URL_ENV)
            .map_err(|_| OrmError::Connection(format!("{DATABASE_URL_ENV} is not set")))?;
        let mut config = Self::new(url);
        if let Ok(column) = std::env::var(GENERATED_KEY_ENV) {
            if !column.trim().is_empty() {
                config = config.generated_key_column(column);
            }
        }
        Ok(config)
    }

    /// Read back `column` from every INSERT as its generated key.
    ///
    /// Every table inserted into through this connection must have it.
    pub fn generated_key_column(mut self, column: impl Into<String>) -> Self {
        self.generated_key_column = Some(column.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PgConfig::new("postgres://localhost/app");
        assert_eq!(config.url, "postgres://localhost/app");
        assert_eq!(config.generated_key_column, None);
    }

    #[test]
    fn test_config_builder() {
        let config = PgConfig::new("host=localhost").generated_key_column("user_id");
        assert_eq!(config.generated_key_column.as_deref(), Some("user_id"));
    }
}
