//! Request handler module
//!
//! The router resolves a path against the route table and dispatches to the
//! page, JSON and static-file handlers below.

pub mod docs;
pub mod info;
pub mod manifest;
pub mod openapi;
pub mod pages;
pub mod router;
pub mod static_files;
pub mod url_preview;

// Re-export main entry point
pub use router::handle_request;
