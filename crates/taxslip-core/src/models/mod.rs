//! Data models for tax slip extraction.

pub mod config;
pub mod slip;

pub use config::{ExtractionConfig, OutputConfig};
pub use slip::{CanonicalFields, ExtractionResult, PageRecord, SlipType, UNKNOWN_ISSUER};
