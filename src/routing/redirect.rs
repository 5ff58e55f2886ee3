//! Legacy path rewriting
//!
//! `override_path(source, target, depth)` keeps the segments of `source`
//! after the first `depth` ones and re-roots them under `target`.

pub fn override_path(source: &str, target: &str, depth: usize) -> String {
    let segments: Vec<&str> = target
        .split('/')
        .filter(|s| !s.is_empty())
        .chain(source.split('/').filter(|s| !s.is_empty()).skip(depth))
        .collect();
    format!("/{}", segments.join("/"))
}

/// `/othello/...` moved under `/games/reversi/...`
pub fn othello(path: &str) -> String {
    override_path(path, "games/reversi", 1)
}

/// `/reversi/...` moved under `/games/reversi/...`
pub fn reversi(path: &str) -> String {
    override_path(path, "games", 0)
}
