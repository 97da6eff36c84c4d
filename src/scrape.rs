use core::time::Duration;

mod puppeteer;

pub use puppeteer::*;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Chrome is torn down after this long without CDP traffic. Navigation alone may take a minute.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(180);

/// A rendered page: where the tab currently is and its serialized DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub url: String,
    pub html: String,
}
