use std::{borrow::Cow, ffi::OsStr, sync::Arc, time::Duration};

use headless_chrome::{
    Browser, LaunchOptions, Tab, browser::tab::NoElementFound, protocol::cdp::Emulation,
};
use tokio::{task::spawn_blocking, time::sleep};

use super::{Document, IDLE_TIMEOUT};

pub fn puppeteer(
    headless: bool,
    proxy: Option<&str>,
    window_size: (u32, u32),
) -> anyhow::Result<Browser> {
    Browser::new(LaunchOptions {
        args: vec![
            OsStr::new("--disable-blink-features=AutomationControlled"),
            OsStr::new("--disable-setuid-sandbox"),
        ],
        headless,
        sandbox: false,
        window_size: Some(window_size),
        proxy_server: proxy,
        idle_browser_timeout: IDLE_TIMEOUT,
        ..LaunchOptions::default()
    })
}

#[allow(clippy::significant_drop_tightening)]
pub fn first_tab(browser: &Browser) -> anyhow::Result<Arc<Tab>> {
    let tab = browser.new_tab()?;

    {
        let tabs_guard = browser
            .get_tabs()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        for remain in &*tabs_guard {
            if !Arc::ptr_eq(&tab, remain) {
                remain.close(true)?;
            }
        }
    }

    Ok(tab)
}

/// Device metrics for a plain desktop viewport of `width`x`height` CSS pixels.
pub const fn viewport(width: u32, height: u32) -> Emulation::SetDeviceMetricsOverride {
    Emulation::SetDeviceMetricsOverride {
        width,
        height,
        device_scale_factor: 1.0,
        mobile: false,
        scale: None,
        screen_width: None,
        screen_height: None,
        position_x: None,
        position_y: None,
        dont_set_visible_size: None,
        screen_orientation: None,
        viewport: None,
        display_feature: None,
        device_posture: None,
    }
}

/// Pins the layout viewport; `--window-size` only sizes the outer window.
pub async fn set_viewport_async(tab: &Arc<Tab>, (width, height): (u32, u32)) -> anyhow::Result<()> {
    let tab = Arc::clone(tab);

    spawn_blocking(move || tab.call_method(viewport(width, height)).map(|_| ())).await?
}

/// Navigates and blocks until the frame stops loading, failing after `timeout`.
pub async fn navigate_to(
    tab: &Arc<Tab>,
    url: Cow<'static, str>,
    timeout: Duration,
) -> anyhow::Result<()> {
    let tab = Arc::clone(tab);

    spawn_blocking(move || {
        tab.set_default_timeout(timeout)
            .navigate_to(&url)?
            .wait_until_navigated()
            .map(|_| ())
    })
    .await?
}

pub async fn find_async(tab: &Arc<Tab>, selector: Cow<'static, str>) -> anyhow::Result<()> {
    let tab = Arc::clone(tab);

    spawn_blocking(move || tab.find_element(&selector).map(|_| ())).await?
}

/// Polls until `selector` matches. Unbounded: callers wrap it in a timeout.
pub async fn wait_for_async(tab: &Arc<Tab>, selector: Cow<'static, str>) -> anyhow::Result<()> {
    const PERIOD: Duration = Duration::from_millis(1832 / 4);

    loop {
        match find_async(tab, selector.clone()).await {
            Ok(()) => break Ok(()),
            Err(err) => {
                if !err.is::<NoElementFound>() {
                    break Err(err);
                }
            }
        }

        sleep(PERIOD).await;
    }
}

/// The DOM is serialized here and re-parsed by the caller, so markup the HTML parser
/// repairs on the way back in (an `<a>` nested in another `<a>`, say) can come out as a
/// different tree than the live one.
pub async fn document_async(tab: &Arc<Tab>) -> anyhow::Result<Document> {
    let tab = Arc::clone(tab);

    spawn_blocking(move || -> anyhow::Result<Document> {
        let html = tab.get_content()?;
        Ok(Document {
            url: tab.get_url(),
            html,
        })
    })
    .await?
}

/// Scrolls the window down by `factor` viewport heights.
pub async fn scroll_async(tab: &Arc<Tab>, factor: f64) -> anyhow::Result<()> {
    let tab = Arc::clone(tab);
    let script = format!("window.scrollBy(0, window.innerHeight * {factor})");

    spawn_blocking(move || tab.evaluate(&script, false).map(|_| ())).await?
}
