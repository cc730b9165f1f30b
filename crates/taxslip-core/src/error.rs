//! Error types for the taxslip-core library.

use thiserror::Error;

/// Main error type for the taxslip library.
#[derive(Error, Debug)]
pub enum TaxslipError {
    /// Custom pattern registration error.
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[cfg(feature = "pdf")]
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to write the bookmarked document.
    #[error("failed to write PDF: {0}")]
    Write(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised while registering a custom field pattern.
///
/// A rejected pattern never reaches the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Field name is empty or whitespace.
    #[error("field name must not be empty")]
    EmptyName,

    /// Expression failed to compile.
    #[error("invalid expression for {name}: {reason}")]
    InvalidExpression { name: String, reason: String },

    /// Expression compiles to a program larger than the configured limit.
    #[error("expression for {name} exceeds the compiled size limit of {limit} bytes")]
    TooLarge { name: String, limit: usize },

    /// Requested capture group does not exist in the expression.
    #[error("expression for {name} has {available} capture group(s), group {requested} requested")]
    MissingGroup {
        name: String,
        requested: usize,
        available: usize,
    },
}

/// Result type for the taxslip library.
pub type Result<T> = std::result::Result<T, TaxslipError>;
