use std::sync::Arc;

use dscr::scrape::{Document, document_async, scroll_async};
use headless_chrome::Tab;

use crate::collect::Surface;

/// Viewport heights per scroll step.
const SCROLL_FACTOR: f64 = 1.5;

pub struct ChromeSurface {
    tab: Arc<Tab>,
}

impl ChromeSurface {
    pub const fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }
}

impl Surface for ChromeSurface {
    async fn snapshot(&self) -> anyhow::Result<Document> {
        document_async(&self.tab).await
    }

    async fn advance(&self) -> anyhow::Result<()> {
        scroll_async(&self.tab, SCROLL_FACTOR).await
    }
}
