use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwmsError {
    #[error("Cannot read file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a valid spreadsheet: {message}")]
    ParseError { message: String },

    #[error("Local store error: {message}")]
    StoreError { message: String },

    #[error("Server upload failed: {message}")]
    SyncWarning { message: String },

    #[error("Nothing to export: {message}")]
    ExportError { message: String },

    #[error("Record not found: {id}")]
    NotFound { id: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl From<rusqlite::Error> for AwmsError {
    fn from(err: rusqlite::Error) -> Self {
        AwmsError::StoreError {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Storage,
    Network,
    Export,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AwmsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AwmsError::ReadError { .. } | AwmsError::ParseError { .. } => ErrorCategory::Input,
            AwmsError::StoreError { .. } | AwmsError::NotFound { .. } => ErrorCategory::Storage,
            AwmsError::SyncWarning { .. } | AwmsError::HttpError(_) => ErrorCategory::Network,
            AwmsError::ExportError { .. } | AwmsError::ZipError(_) | AwmsError::CsvError(_) => {
                ErrorCategory::Export
            }
            AwmsError::ConfigError { .. }
            | AwmsError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AwmsError::IoError(_) | AwmsError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    /// 同步失敗只是警告：本地資料已經安全寫入
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AwmsError::SyncWarning { .. } => ErrorSeverity::Low,
            AwmsError::ExportError { .. } | AwmsError::NotFound { .. } => ErrorSeverity::Medium,
            AwmsError::ReadError { .. }
            | AwmsError::ParseError { .. }
            | AwmsError::HttpError(_)
            | AwmsError::CsvError(_)
            | AwmsError::ZipError(_)
            | AwmsError::ConfigError { .. }
            | AwmsError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            AwmsError::StoreError { .. }
            | AwmsError::IoError(_)
            | AwmsError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AwmsError::ReadError { .. } => "Check that the file exists and is readable",
            AwmsError::ParseError { .. } => "Choose an Excel (.xlsx, .xls, .xlsb) or OpenDocument (.ods) file",
            AwmsError::StoreError { .. } => "Check free disk space and permissions of the local database",
            AwmsError::SyncWarning { .. } | AwmsError::HttpError(_) => {
                "The file is stored locally; upload it again once the server is reachable"
            }
            AwmsError::ExportError { .. } => "Upload a file or relax the search filter first",
            AwmsError::NotFound { .. } => "Run `list` to see the stored records",
            AwmsError::ConfigError { .. }
            | AwmsError::InvalidConfigValueError { .. } => "Fix the configuration file or command line flags",
            AwmsError::ZipError(_) | AwmsError::CsvError(_) | AwmsError::IoError(_) => {
                "Check the output location and try again"
            }
            AwmsError::SerializationError(_) => "The stored record may be corrupted; delete and upload it again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AwmsError::ReadError { path, .. } => format!("Could not read '{}'.", path),
            AwmsError::ParseError { .. } => "Error parsing file.".to_string(),
            AwmsError::StoreError { message } => {
                format!("The file was NOT saved locally ({}).", message)
            }
            AwmsError::SyncWarning { message } => {
                format!("Saved locally, but server upload failed: {}", message)
            }
            AwmsError::ExportError { message } => message.clone(),
            AwmsError::NotFound { id } => format!("Stored file #{} not found.", id),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwmsError>;
