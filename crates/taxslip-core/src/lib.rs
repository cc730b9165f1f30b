//! Core library for Canadian tax slip processing.
//!
//! This crate provides:
//! - Slip type classification (T4, T4A, T5, T3, T5008, T1135, ...)
//! - Canonical field extraction (SIN, issuer name, taxpayer name)
//! - A runtime registry of caller-defined field patterns
//! - PDF page text extraction and bookmarking (`pdf` feature)

pub mod error;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod slip;

pub use error::{PatternError, Result, TaxslipError};
#[cfg(feature = "pdf")]
pub use error::PdfError;
pub use models::{CanonicalFields, ExtractionConfig, ExtractionResult, OutputConfig, PageRecord, SlipType};
#[cfg(feature = "pdf")]
pub use pdf::{PageBookmark, PdfExtractor, PdfProcessor};
pub use slip::{PatternRegistry, PatternRule, PatternSpec, SlipEngine, SlipExtractor};
