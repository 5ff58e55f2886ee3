//! HTTP protocol layer module
//!
//! Response builders, cache policies and MIME detection shared by all
//! route handlers.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use cache::CachePolicy;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_500_response,
    build_body_response, build_file_response, build_html_response, build_json_response,
    build_redirect_response, HttpResponse,
};
