//! Error types for the climate API
//!
//! Every failure carries a numeric [`ErrorCode`] and a severity. Errors that
//! reach an HTTP client are rendered by [`ErrorReporter::format_api_error`].

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for climate API operations
pub type Result<T> = std::result::Result<T, ClimateError>;

/// Error types for storage, query and server operations
#[derive(Error, Debug)]
pub enum ClimateError {
    /// No measurement rows exist
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    /// Storage connection could not be established or was lost
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Stored schema does not match the declared one
    #[error("Schema mismatch: {0}")]
    Schema(String),

    /// Stored values that cannot be interpreted
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Generic(#[from] anyhow::Error),
}

/// Machine-readable error code, grouped by hundreds into categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    StorageUnavailable = 1001,
    QueryFailed = 1002,
    SchemaMismatch = 1003,

    EmptyDataset = 1101,
    DataCorrupted = 1102,
    InvalidInput = 1103,

    ConfigurationInvalid = 1201,

    InternalError = 1901,
}

impl ErrorCode {
    /// Numeric code reported to clients
    pub fn as_number(self) -> u32 {
        self as u32
    }

    /// Category derived from the code's hundreds block
    pub fn category(self) -> &'static str {
        match self.as_number() / 100 {
            10 => "storage",
            11 => "data",
            12 => "configuration",
            _ => "internal",
        }
    }
}

/// Where an error surfaced
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub component: &'static str,
    pub operation: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl ErrorContext {
    pub fn new(component: &'static str, operation: &'static str) -> Self {
        Self {
            component,
            operation,
            timestamp: Utc::now(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The process cannot serve any request
    Critical,
    Error,
    /// Expected outcome for some inputs or datasets
    Warning,
}

/// Error as it is logged and reported
#[derive(Debug, Clone)]
pub struct StructuredError {
    pub code: ErrorCode,
    pub message: String,
    pub severity: ErrorSeverity,
    pub is_retryable: bool,
    pub context: Option<ErrorContext>,
    pub timestamp: DateTime<Utc>,
}

impl ClimateError {
    pub fn empty_dataset<S: Into<String>>(msg: S) -> Self {
        Self::EmptyDataset(msg.into())
    }

    pub fn storage_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }

    pub fn invalid_data<S: Into<String>>(msg: S) -> Self {
        Self::InvalidData(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Wrap a failure from outside the crate's own error domain
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Generic(anyhow::anyhow!(msg.into()))
    }

    pub fn to_error_code(&self) -> ErrorCode {
        match self {
            ClimateError::EmptyDataset(_) => ErrorCode::EmptyDataset,
            ClimateError::StorageUnavailable(_) => ErrorCode::StorageUnavailable,
            ClimateError::Database(_) => ErrorCode::QueryFailed,
            ClimateError::Schema(_) => ErrorCode::SchemaMismatch,
            ClimateError::InvalidData(_) => ErrorCode::DataCorrupted,
            ClimateError::Config(_) => ErrorCode::ConfigurationInvalid,
            ClimateError::InvalidInput(_) => ErrorCode::InvalidInput,
            ClimateError::Io(_) | ClimateError::Generic(_) => ErrorCode::InternalError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClimateError::StorageUnavailable(_) | ClimateError::Schema(_) => {
                ErrorSeverity::Critical
            }
            ClimateError::InvalidInput(_) | ClimateError::EmptyDataset(_) => {
                ErrorSeverity::Warning
            }
            _ => ErrorSeverity::Error,
        }
    }

    /// Only a lost storage connection can succeed on retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClimateError::StorageUnavailable(_))
    }

    pub fn to_structured_error(&self, context: Option<ErrorContext>) -> StructuredError {
        let timestamp = context.as_ref().map_or_else(Utc::now, |c| c.timestamp);

        StructuredError {
            code: self.to_error_code(),
            message: self.sanitized_message(),
            severity: self.severity(),
            is_retryable: self.is_retryable(),
            context,
            timestamp,
        }
    }

    /// Message safe to show clients; release builds hide storage details
    pub fn sanitized_message(&self) -> String {
        #[cfg(debug_assertions)]
        {
            self.to_string()
        }
        #[cfg(not(debug_assertions))]
        {
            match self {
                ClimateError::EmptyDataset(_) => "No measurements available".to_string(),
                ClimateError::StorageUnavailable(_) => {
                    "Storage temporarily unavailable".to_string()
                }
                ClimateError::Database(_) => "Query failed".to_string(),
                ClimateError::Schema(_) => "Storage schema mismatch".to_string(),
                ClimateError::InvalidData(_) => "Stored data could not be read".to_string(),
                ClimateError::Config(_) => "Configuration error".to_string(),
                ClimateError::InvalidInput(_) => "Invalid input provided".to_string(),
                ClimateError::Io(_) => "I/O operation failed".to_string(),
                ClimateError::Generic(_) => "Internal error occurred".to_string(),
            }
        }
    }
}

impl From<sqlx::Error> for ClimateError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ClimateError::StorageUnavailable(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                ClimateError::InvalidData(err.to_string())
            }
            other => ClimateError::Database(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for ClimateError {
    fn from(err: config::ConfigError) -> Self {
        ClimateError::Config(err.to_string())
    }
}

/// Error logging and reporting utilities
pub struct ErrorReporter;

impl ErrorReporter {
    /// Log an error at the level matching its severity
    pub fn log_error(error: &ClimateError, context: Option<ErrorContext>) {
        let report = error.to_structured_error(context);
        let (component, operation) = report
            .context
            .as_ref()
            .map_or(("unknown", "unknown"), |c| (c.component, c.operation));
        let code = report.code.as_number();
        let category = report.code.category();

        match report.severity {
            ErrorSeverity::Critical => tracing::error!(
                error_code = code,
                category,
                component,
                operation,
                "Critical error: {}",
                report.message
            ),
            ErrorSeverity::Error => tracing::error!(
                error_code = code,
                category,
                component,
                operation,
                "Error: {}",
                report.message
            ),
            ErrorSeverity::Warning => tracing::warn!(
                error_code = code,
                category,
                component,
                operation,
                "Warning: {}",
                report.message
            ),
        }
    }

    /// JSON body for API error responses; `include_details` adds the severity
    pub fn format_api_error(error: &ClimateError, include_details: bool) -> serde_json::Value {
        let report = error.to_structured_error(None);

        let mut response = serde_json::json!({
            "error": {
                "code": report.code.as_number(),
                "category": report.code.category(),
                "message": report.message,
                "retryable": report.is_retryable,
                "timestamp": report.timestamp.to_rfc3339(),
            }
        });

        if include_details {
            response["error"]["severity"] =
                serde_json::Value::String(format!("{:?}", report.severity));
        }

        response
    }
}

/// Log `$error` with the component and operation it surfaced in
#[macro_export]
macro_rules! log_structured_error {
    ($error:expr, $component:expr, $operation:expr) => {
        $crate::error::ErrorReporter::log_error(
            &$error,
            Some($crate::error::ErrorContext::new($component, $operation)),
        )
    };
}
