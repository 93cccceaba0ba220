//! Error types.
//!
//! - `StatsError` is returned by the numeric core (`stats::*`).
//! - `AppError` is what pipelines and the binary deal in: a message plus the
//!   process exit code it maps to.
//!
//! Exit codes:
//! - `2` input or configuration problem (missing file, bad column, bad flag)
//! - `3` no usable data
//! - `4` computation, rendering or write failure

/// Failures of the numeric core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// The input was empty after cleaning, or too short for the statistic.
    InsufficientData(String),
    /// A caller-supplied parameter is out of range (e.g. zero classes).
    InvalidParameter(String),
}

impl std::fmt::Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsError::InsufficientData(msg) => write!(f, "Insufficient data: {msg}"),
            StatsError::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
        }
    }
}

impl std::error::Error for StatsError {}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// Prefix the message with the variable or step that failed.
    pub fn context(self, what: impl std::fmt::Display) -> Self {
        Self {
            exit_code: self.exit_code,
            message: format!("{what}: {}", self.message),
        }
    }
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        let exit_code = match err {
            StatsError::InsufficientData(_) => 3,
            StatsError::InvalidParameter(_) => 2,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_errors_map_to_exit_codes() {
        let err: AppError = StatsError::InsufficientData("empty".to_string()).into();
        assert_eq!(err.exit_code(), 3);

        let err: AppError = StatsError::InvalidParameter("num_classes = 0".to_string()).into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("num_classes = 0"));
    }

    #[test]
    fn context_prefixes_message() {
        let err = AppError::new(2, "file not found").context("caudal");
        assert_eq!(err.to_string(), "caudal: file not found");
        assert_eq!(err.exit_code(), 2);
    }
}
