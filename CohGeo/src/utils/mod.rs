//! Utility functions

pub mod path;

pub use path::{find_path_case_insensitive, normalize_path, relative_path, with_extension};
