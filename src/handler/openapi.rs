//! Generated API document
//!
//! An OpenAPI 3.0 description of the documented routes in the route table.

use serde_json::{json, Map, Value};

use crate::config::AppState;
use crate::error::Result;
use crate::http::{self, HttpResponse};
use crate::routing::{Route, ROUTES};

/// `GET /api.json`
pub async fn serve(state: &AppState) -> Result<HttpResponse> {
    let meta = state.services.meta.fetch(false).await?;
    let doc = generate(
        ROUTES,
        meta.name_or(state.brand_name()),
        &state.config.web.version,
        &state.config.web.url,
    );
    Ok(http::build_json_response(&doc, None)?)
}

pub fn generate(routes: &[Route], title: &str, version: &str, url: &str) -> Value {
    let mut paths = Map::new();
    for route in routes {
        let Some(doc_path) = route.doc_path else {
            continue;
        };
        paths.insert(doc_path.to_string(), json!({ "get": operation(route, doc_path) }));
    }

    json!({
        "openapi": "3.0.0",
        "info": {
            "version": version,
            "title": title,
        },
        "servers": [{ "url": url }],
        "paths": paths,
    })
}

fn operation(route: &Route, doc_path: &str) -> Value {
    let mut op = Map::new();
    op.insert("operationId".to_string(), json!(format!("{:?}", route.kind)));
    op.insert("summary".to_string(), json!(route.summary));

    let params: Vec<Value> = path_params(doc_path)
        .map(|name| json!({ "name": name, "in": "path", "required": true, "schema": { "type": "string" } }))
        .collect();
    if !params.is_empty() {
        op.insert("parameters".to_string(), Value::Array(params));
    }

    op.insert(
        "responses".to_string(),
        json!({ "200": { "description": "OK" } }),
    );
    Value::Object(op)
}

/// Names of `{param}` placeholders in a path template
fn path_params(template: &str) -> impl Iterator<Item = &str> {
    template.split('/').filter_map(|segment| {
        segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
    })
}
