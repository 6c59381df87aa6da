//! Data models for the audit backend.
//!
//! These mirror the JSON documents kept in the bucket.

mod project;
mod tag;

pub use project::*;
pub use tag::*;
