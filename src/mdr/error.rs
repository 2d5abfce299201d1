//! Custom error types for the mdr-index crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum MdrError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the MDR signature.
    #[error("Bad signature: expected \"GARMIN MDR\", got {found:?}")]
    BadSignature { found: Vec<u8> },

    /// The file is structurally invalid or does not conform to the MDR layout.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The code page has no known character encoding.
    #[error("Unsupported code page: {0}")]
    UnsupportedCodePage(u16),

    /// The string pool grew past what a 3-byte offset can address.
    #[error("String pool overflow: {size} bytes exceeds the 24-bit offset limit")]
    StringPoolOverflow { size: u64 },

    /// A section header records a different byte span than was written.
    #[error("Section {section} size mismatch: expected {expected} bytes, wrote {written}")]
    SectionSizeMismatch {
        section: u8,
        expected: u64,
        written: u64,
    },
}

/// A convenience `Result` type alias using the crate's `MdrError` type.
pub type Result<T> = std::result::Result<T, MdrError>;
