//! Shared helpers: paths, JSON files, strings and errors.

pub mod errors;
pub mod file_handler;
pub mod paths;
pub mod string_utils;

pub use errors::ConfigError;
pub use string_utils::{clean_markdown, truncate_chars};
