//! Per-use-case extraction policies.
//!
//! Each module owns one entry point: it opens a page session, verifies the
//! page-kind markers it needs, collects through the extraction layer and
//! closes the session on every exit path before returning.

pub mod details;
pub mod listing;
pub mod product;
pub mod reviews;
