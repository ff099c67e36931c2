//! Error types for mg-core

use thiserror::Error;

/// Core error type for Migrant
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Migrations directory missing or unreadable
    #[error("[E003] Cannot read migrations directory '{path}': {source}")]
    DirectoryUnreadable {
        path: String,
        source: std::io::Error,
    },

    /// E004: Two files resolve to the same script identity
    #[error("[E004] Ambiguous script identity '{identity}': both '{first}' and '{second}' map to it. Rename one of the files.")]
    DuplicateIdentity {
        identity: String,
        first: String,
        second: String,
    },

    /// E005: IO error with file path context
    #[error("[E005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E006: Config YAML parse error
    #[error("[E006] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// E007: Script content is not UTF-8
    #[error("[E007] Script '{path}' is not valid UTF-8 ({source}). Re-save it as UTF-8.")]
    ScriptNotUtf8 {
        path: String,
        source: std::str::Utf8Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
