//! datefold - copy images into year-month folders
//!
//! This library finds image files under a directory, works out a date bucket
//! for each one (from the filename, else the modification time) and copies
//! it into `organized/<YYYY-MM>/` beside the source directory.

pub mod cli;
pub mod config;
pub mod date_bucket;
pub mod file_organizer;
pub mod output;
pub mod scanner;
pub mod summary;

pub use config::{CompiledFilters, ConfigError, OrganizeConfig};
pub use date_bucket::{BucketAssignment, DateBucket, DateSource};
pub use file_organizer::{FileOrganizer, OrganizeError};
pub use summary::RunSummary;

pub use cli::{OrganizeOptions, OrganizeOutcome, organize, run_cli};
