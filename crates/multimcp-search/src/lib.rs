#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod error;
pub mod search;
pub mod tools;

pub use error::SearchError;
pub use tools::{SearchContext, search_tools};

/// Prefix of every failed tool result text.
pub const ERROR_PREFIX: &str = "Search error";
