//! Shared types, error model, and configuration for relchron.
//!
//! This crate is the foundation depended on by all other relchron crates.
//! It provides:
//! - [`RelchronError`] — the unified error type
//! - Domain types ([`VersionCatalog`], [`CatalogEntry`], [`MilestoneDoc`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, FeedConfig, ResolveConfig, SourceEntry, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_token,
};
pub use error::{RelchronError, Result};
pub use types::{
    CATALOG_SCHEMA_VERSION, CatalogEntry, Channel, MilestoneDoc, MilestoneEntry, SurfaceEntry,
    VersionCatalog,
};
