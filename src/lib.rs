//! Photos Migrator - move staged photo files into a photo library and back
//!
//! Photos are staged as plain files inside album folders. This library
//! provides:
//! - Folder and file catalogs over a pluggable file store
//! - An on-disk photo library with all-or-nothing change batches
//! - Import and export pipelines matching folders to albums by name
//! - xxHash-verified asset payloads and EXIF capture dates
//! - A background worker reporting progress over a channel
//! - Reorganizing albums into collections

// Initialize i18n with locale files
rust_i18n::i18n!("locales", fallback = "en");

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod i18n;
pub mod library;
pub mod migrate;
pub mod notice;
pub mod reorganize;
pub mod store;

pub use catalog::{FileCatalog, Folder, FolderCatalog, FolderState, Listed, StagedFile};
pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use i18n::init_locale;
pub use library::{LocalLibrary, PhotoLibrary};
pub use migrate::{ExportOutcome, ImportReport, MigrationEvent, MigrationWorker};
pub use notice::{Notice, NoticeLevel};
pub use store::{FileStore, LocalFileStore};
