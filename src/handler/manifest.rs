//! Web app manifest with the instance name filled in

use serde_json::Value;

use crate::config::AppState;
use crate::error::Result;
use crate::http::{self, CachePolicy, HttpResponse};

/// `GET /manifest.json`
pub async fn serve(state: &AppState) -> Result<HttpResponse> {
    let path = state.config.web.assets_dir().join("manifest.json");
    let raw = tokio::fs::read(&path).await?;
    let mut manifest: Value = serde_json::from_slice(&raw)?;

    let meta = state.services.meta.fetch(true).await?;
    apply_name(&mut manifest, meta.name_or(state.brand_name()));

    Ok(http::build_json_response(
        &manifest,
        Some(CachePolicy::MANIFEST),
    )?)
}

fn apply_name(manifest: &mut Value, name: &str) {
    if let Value::Object(fields) = manifest {
        fields.insert("short_name".to_string(), Value::from(name));
        fields.insert("name".to_string(), Value::from(name));
    }
}
