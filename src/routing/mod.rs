//! Routing module
//!
//! Ordered route table, first-match path resolution and the legacy
//! redirect rules.

mod matcher;
pub mod redirect;
mod table;

pub use matcher::{match_route, Matched};
pub use table::{Route, RouteKind, ROUTES};
