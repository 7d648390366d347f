//! Conversions from external infrastructure errors into domain errors.

use std::fmt;
use std::io::{Error as IoError, ErrorKind};

use gametest_domain::GametestError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GametestError);

impl InfraError {
    /// Prefix the message with `context`, keeping the variant.
    #[must_use]
    pub fn with_context(self, context: impl fmt::Display) -> Self {
        use GametestError as E;

        let prefix = |message: String| format!("{context}: {message}");
        Self(match self.0 {
            E::Network(message) => E::Network(prefix(message)),
            E::Timeout(message) => E::Timeout(prefix(message)),
            E::Config(message) => E::Config(prefix(message)),
            E::InvalidInput(message) => E::InvalidInput(prefix(message)),
            E::Scheduler(message) => E::Scheduler(prefix(message)),
            E::Internal(message) => E::Internal(prefix(message)),
            other => other,
        })
    }
}

impl From<InfraError> for GametestError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GametestError> for InfraError {
    fn from(value: GametestError) -> Self {
        Self(value)
    }
}

impl fmt::Display for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for InfraError {}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoGametestError {
    fn into_gametest(self) -> GametestError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → GametestError */
/* -------------------------------------------------------------------------- */

impl IntoGametestError for HttpError {
    fn into_gametest(self) -> GametestError {
        if self.is_timeout() {
            return GametestError::Timeout(self.to_string());
        }

        if self.is_connect() {
            return GametestError::Network(format!("connection failure: {self}"));
        }

        if self.is_builder() {
            return GametestError::InvalidInput(self.to_string());
        }

        GametestError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_gametest())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → GametestError */
/* -------------------------------------------------------------------------- */

// Only configuration inputs are read from disk.
impl IntoGametestError for IoError {
    fn into_gametest(self) -> GametestError {
        match self.kind() {
            ErrorKind::NotFound => GametestError::Config("file not found".into()),
            ErrorKind::PermissionDenied => GametestError::Config("permission denied".into()),
            ErrorKind::InvalidData => GametestError::Config("file is not valid UTF-8".into()),
            _ => GametestError::Config(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        Self(value.into_gametest())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → GametestError */
/* -------------------------------------------------------------------------- */

impl IntoGametestError for JsonError {
    fn into_gametest(self) -> GametestError {
        // serde_json reports position only, never the offending text.
        GametestError::Config(format!("invalid JSON: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(value.into_gametest())
    }
}

impl IntoGametestError for TomlError {
    fn into_gametest(self) -> GametestError {
        GametestError::Config(format!("invalid TOML: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        Self(value.into_gametest())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
