// Application state module
// Bundles configuration with the injected collaborators every handler needs

use std::sync::Arc;

use super::types::Config;
use crate::handler::url_preview::UrlPreviewer;
use crate::store::Services;
use crate::views::Views;

/// Application state
pub struct AppState {
    pub config: Config,
    pub services: Services,
    pub views: Views,
    pub previewer: Arc<dyn UrlPreviewer>,
    pub access_log: bool,
}

impl AppState {
    pub fn new(
        config: Config,
        services: Services,
        views: Views,
        previewer: Arc<dyn UrlPreviewer>,
    ) -> Self {
        Self {
            access_log: config.logging.access_log,
            config,
            services,
            views,
            previewer,
        }
    }

    /// Instance name fallback
    pub fn brand_name(&self) -> &str {
        &self.config.web.brand_name
    }
}
