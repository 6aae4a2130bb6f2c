//! Shared types, error model, and configuration for CivicWatch.
//!
//! This crate is the foundation depended on by all other CivicWatch crates.
//! It provides:
//! - [`CivicWatchError`] — the unified error type
//! - Domain types ([`Tender`], [`CitizenReport`], [`WardEntry`])
//! - Configuration ([`AppConfig`], [`ScrapeConfig`], config loading)
//! - Civic formatting helpers ([`format_inr`], [`project_status`])

pub mod civic;
pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use civic::{ProjectStatus, format_inr, project_status};
pub use config::{
    AppConfig, DefaultsConfig, ScrapeConfig, ScrapeSectionConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{CivicWatchError, Result};
pub use types::{CLOSING_DATE_FALLBACK, CitizenReport, Tender, WardEntry};
