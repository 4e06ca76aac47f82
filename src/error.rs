use miette::Diagnostic;
use thiserror::Error;

/// Main error type for avakit operations
#[derive(Error, Diagnostic, Debug)]
pub enum AvatarError {
    #[error("IO error: {0}")]
    #[diagnostic(code(avakit::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(avakit::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(avakit::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid sprite sheet: {message}")]
    #[diagnostic(code(avakit::descriptor))]
    InvalidDescriptor {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Failed to load image '{url}': {message}")]
    #[diagnostic(code(avakit::load))]
    LoadFailure { url: String, message: String },

    #[error("Validation error: {message}")]
    #[diagnostic(code(avakit::validate))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Export error: {message}")]
    #[diagnostic(code(avakit::export))]
    Export {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Upload failed: {message}")]
    #[diagnostic(code(avakit::upload))]
    Upload { message: String },
}

pub type Result<T> = std::result::Result<T, AvatarError>;
