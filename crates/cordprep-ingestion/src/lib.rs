//! cordprep-ingestion — Dataset preparation for the CORD-19 literature corpus.
//! - Metadata/file join with license-category filtering
//! - Full-text section extraction

pub mod metadata;
pub mod models;
pub mod sections;

pub use metadata::{join_metadata, ExtraMetadata, IdMismatch, JoinedDataset, MetadataSource};
pub use models::{CategorySelector, JoinedTable, LicenseCategory, MetadataTable, SectionRecord, SectionTable};
pub use sections::{extract_sections, DEFAULT_MIN_TOKENS};
