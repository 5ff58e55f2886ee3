//! Route matching module
//!
//! Linear first-match resolution of a request path against the route table.

use super::table::{PathMatch, Route};

/// A resolved route and the path segment it captured, if any
#[derive(Debug, Clone, Copy)]
pub struct Matched<'r, 'p> {
    pub route: &'r Route,
    pub capture: Option<&'p str>,
}

/// Find the first matching route for a given path
pub fn match_route<'r, 'p>(path: &'p str, routes: &'r [Route]) -> Option<Matched<'r, 'p>> {
    routes.iter().find_map(|route| {
        match_path(route.path, path).map(|capture| Matched { route, capture })
    })
}

/// Check a path against one rule
///
/// `Some(capture)` on a match, where `capture` is the captured segment for
/// rules that capture one.
pub fn match_path(rule: PathMatch, path: &str) -> Option<Option<&str>> {
    match rule {
        PathMatch::Exact(exact) => (trim_one_slash(path) == exact).then_some(None),
        PathMatch::Prefix(prefix) => path.starts_with(prefix).then_some(None),
        PathMatch::Segment(segment) => {
            let rest = path.strip_prefix(segment)?;
            (rest.is_empty() || rest.starts_with('/')).then_some(None)
        }
        PathMatch::Param(prefix) => {
            let param = trim_one_slash(path).strip_prefix(prefix)?;
            (!param.is_empty() && !param.contains('/')).then_some(Some(param))
        }
        PathMatch::Wrapped { prefix, suffix } => {
            let token = path.strip_prefix(prefix)?.strip_suffix(suffix)?;
            (!token.is_empty()).then_some(Some(token))
        }
        PathMatch::Any => Some(None),
    }
}

fn trim_one_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}
