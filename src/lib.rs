//! MimiMoe - catalog source adapter for the mimimoe.moe manga API.
//!
//! This library provides:
//! - A `Source` trait describing what a manga reader needs from a site
//! - The MimiMoe implementation of that trait over the site's JSON API
//! - Chapter number recognition for ordering chapter lists

pub mod chapter_recognition;
pub mod config;
pub mod console;
pub mod error;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, SourceConfig};
pub use console::Console;
pub use error::{ConfigError, SourceError};
pub use sources::{
    Chapter, Manga, MangaStatus, MangasPage, MimiMoe, Page, SortOrder, Source, SourceRegistry,
};
