use thiserror::Error;

/// Failure reading or writing the catalog file
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog file {path} is not valid JSON: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Rejected course submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

/// Why a course submission was not stored
#[derive(Debug, Error)]
pub enum AddCourseError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AddCourseError {
    pub fn kind(&self) -> &'static str {
        match self {
            AddCourseError::Validation(_) => "validation",
            AddCourseError::Storage(e) => e.kind(),
        }
    }
}

/// Failure pushing a span batch to an exporter
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("collector rejected batch with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to serialize span batch: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write spans: {0}")]
    Io(#[from] std::io::Error),
}

/// Startup and configuration errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),

    #[error("Failed to build exporter: {0}")]
    Exporter(String),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl StorageError {
    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::Io { .. } => "storage_io",
            StorageError::Corrupt { .. } => "storage_corrupt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::MissingField("instructor");
        assert_eq!(error.to_string(), "missing required field 'instructor'");
    }

    #[test]
    fn test_storage_error_kind() {
        let err = StorageError::Io {
            path: "course_catalog.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.kind(), "storage_io");
        assert!(err.to_string().contains("course_catalog.json"));
    }

    #[test]
    fn test_add_course_error_kind() {
        let err = AddCourseError::from(ValidationError::MissingField("code"));
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.to_string(), "missing required field 'code'");
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::InvalidAddress("nope:port".to_string());
        assert_eq!(err.to_string(), "Invalid listen address 'nope:port'");
    }
}
