//! Server-rendered views
//!
//! Templates are embedded in the binary. A configured override directory
//! takes precedence, so an operator can restyle pages without a rebuild.

use minijinja::{default_auto_escape_callback, Environment, Error, ErrorKind, Value};
use std::path::{Path, PathBuf};

pub struct Views {
    env: Environment<'static>,
}

impl Views {
    /// Build the view environment
    ///
    /// `version` and `url` are exposed to every template as globals.
    pub fn new(override_dir: Option<PathBuf>, version: &str, url: &str) -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.set_loader(move |name| load_template(override_dir.as_deref(), name));
        env.add_global("version", version.to_string());
        env.add_global("url", url.trim_end_matches('/').to_string());
        Self { env }
    }

    pub fn render(&self, name: &str, context: Value) -> Result<String, Error> {
        self.env.get_template(name)?.render(context)
    }
}

fn load_template(override_dir: Option<&Path>, name: &str) -> Result<Option<String>, Error> {
    if let Some(dir) = override_dir {
        // Template names are fixed identifiers; refuse anything path-like
        if !name.contains(['/', '\\']) && !name.starts_with('.') {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return std::fs::read_to_string(&candidate).map(Some).map_err(|e| {
                    Error::new(
                        ErrorKind::InvalidOperation,
                        format!("failed to read template '{}'", candidate.display()),
                    )
                    .with_source(e)
                });
            }
        }
    }
    Ok(embedded(name).map(ToString::to_string))
}

fn embedded(name: &str) -> Option<&'static str> {
    match name {
        "layout.html" => Some(include_str!("templates/layout.html")),
        "base.html" => Some(include_str!("templates/base.html")),
        "note.html" => Some(include_str!("templates/note.html")),
        "info.html" => Some(include_str!("templates/info.html")),
        "flush.html" => Some(include_str!("templates/flush.html")),
        _ => None,
    }
}
