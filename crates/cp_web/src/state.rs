use std::sync::Arc;

use cp_progress::NotificationHub;
use cp_scrapers::ScraperManager;

pub struct AppState {
    pub manager: Arc<ScraperManager>,
    pub hub: Arc<NotificationHub>,
    /// Scrape size when the request names none.
    pub default_limit: usize,
}

impl AppState {
    pub fn new(manager: Arc<ScraperManager>, hub: Arc<NotificationHub>) -> Self {
        Self {
            manager,
            hub,
            default_limit: 5,
        }
    }
}
