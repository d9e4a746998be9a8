use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to launch '{program}': {source}")]
    LaunchError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Chart rendering error: {message}")]
    ChartError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Process,
    Io,
    Data,
    Rendering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl BenchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BenchError::ConfigValidationError { .. }
            | BenchError::InvalidConfigValueError { .. }
            | BenchError::RegexError(_) => ErrorCategory::Configuration,
            BenchError::LaunchError { .. } => ErrorCategory::Process,
            BenchError::IoError(_) => ErrorCategory::Io,
            BenchError::SerializationError(_) | BenchError::CsvError(_) => ErrorCategory::Data,
            BenchError::ChartError { .. } => ErrorCategory::Rendering,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Process => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Rendering => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BenchError::LaunchError { .. } => {
                "Check that the server executable is installed and on PATH, and that the working directory exists"
            }
            BenchError::RegexError(_) => {
                "Fix the ready_pattern; it needs one capture group around the seconds value"
            }
            BenchError::IoError(_) => "Check file paths and permissions",
            BenchError::SerializationError(_) | BenchError::CsvError(_) => {
                "Check that the report file was produced by metal-bench and is not corrupted"
            }
            BenchError::ChartError { .. } => {
                "Check the chart data and that the output directory is writable"
            }
            _ => "Review the configuration file and command line arguments",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Process => format!("Server process problem: {}", self),
            ErrorCategory::Io => format!("File system problem: {}", self),
            ErrorCategory::Data => format!("Report data problem: {}", self),
            ErrorCategory::Rendering => format!("Chart problem: {}", self),
        }
    }

    /// Process exit code for binaries; always non-zero.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl From<toml::de::Error> for BenchError {
    fn from(e: toml::de::Error) -> Self {
        BenchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
