//! URL handling module for Sitewalk
//!
//! This module provides href normalization against a base URL and the link
//! filter predicates that decide which candidates the crawl may follow.

mod filter;
mod normalize;

// Re-export main functions
pub use filter::{any_host, same_host, LinkFilter};
pub use normalize::normalize;
