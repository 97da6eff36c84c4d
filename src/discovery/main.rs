mod chrome;
mod collect;
mod extract;

use core::time::Duration;
use std::path::PathBuf;

use anyhow::Context;

const START_URL: &str = "https://app.youmio.ai/";
const DEFAULT_TARGET: usize = 40;
const VIEWPORT: (u32, u32) = (1400, 900);
const CARD_SELECTOR: &str = r#"article a[href^="/discovery/"]"#;

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);
const CARD_TIMEOUT: Duration = Duration::from_secs(15);
const SETTLE_PAUSE: Duration = Duration::from_secs(2);
const SCROLL_PAUSE: Duration = Duration::from_millis(1500);

/// Scrolls the discovery feed and dumps its cards as JSON.
#[derive(clap::Parser)]
#[command(version)]
struct Args {
    /// Number of cards to collect; anything that is not a number of at least 1 means 40
    #[arg(value_name = "TARGET", allow_negative_numbers = true)]
    target: Option<String>,
    /// Page to scroll
    #[arg(long, env = "DISCOVERY_URL", default_value = START_URL)]
    url: String,
    /// Where the JSON result is written
    #[arg(short, long, env = "DISCOVERY_OUTPUT", default_value = "result.json")]
    output: PathBuf,
    /// Run Chrome without a window
    #[arg(long)]
    headless: bool,
    /// Proxy server handed to Chrome, e.g. http://host:port
    #[arg(long, env = "DISCOVERY_PROXY")]
    proxy: Option<String>,
    /// User-Agent reported by the tab
    #[arg(long, env = "DISCOVERY_USER_AGENT", default_value = dscr::scrape::USER_AGENT)]
    user_agent: String,
}

fn init_logger() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.filter_level(log::LevelFilter::Info),
    };
    builder.init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    use collect::{Limits, collect, persist};

    let target = dscr::util::lenient_count(args.target.as_deref(), DEFAULT_TARGET);
    tracing::info!(target: "main", "starting scraper: target \x1b[1;36m{target}\x1b[0m cards");

    let browser = dscr::scrape::puppeteer(args.headless, args.proxy.as_deref(), VIEWPORT)?;
    let tab = dscr::scrape::first_tab(&browser)?;
    tab.set_user_agent(&args.user_agent, None, None)?;
    dscr::scrape::set_viewport_async(&tab, VIEWPORT).await?;

    tracing::info!(target: "browser", "loading {} ...", args.url);
    dscr::scrape::navigate_to(&tab, args.url.clone().into(), NAVIGATION_TIMEOUT)
        .await
        .with_context(|| format!("navigation to {} failed", args.url))?;

    match tokio::time::timeout(
        CARD_TIMEOUT,
        dscr::scrape::wait_for_async(&tab, CARD_SELECTOR.into()),
    )
    .await
    {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(target: "browser", "card wait failed ({e}), starting scroll ...");
        }
        Err(_) => tracing::warn!(target: "browser", "cards not immediately visible, starting scroll ..."),
    }

    tokio::time::sleep(SETTLE_PAUSE).await;

    tracing::info!(target: "collector", "beginning collection ...");
    let surface = chrome::ChromeSurface::new(tab);
    let collection = collect(&surface, &Limits::new(target), SCROLL_PAUSE).await?;
    tracing::info!(target: "collector", "\x1b[36m{}\x1b[0m", collection.stop);
    tracing::info!(target: "main", "final result: {} cards", collection.records.len());

    persist(&args.output, &collection.records)
        .with_context(|| format!("writing {} failed", args.output.display()))?;
    tracing::info!(target: "main", "saved to \x1b[1;32m{}\x1b[0m", args.output.display());

    drop(surface);
    drop(browser);
    tracing::info!(target: "browser", "browser closed");

    Ok(())
}

#[tokio::main]
async fn main() {
    use clap::Parser;

    init_logger();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!(target: "main", "\x1b[31m{e:?}\x1b[0m");
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["discovery"]).unwrap();
        assert_eq!(dscr::util::lenient_count(args.target.as_deref(), DEFAULT_TARGET), 40);
        assert_eq!(args.url, START_URL);
        assert_eq!(args.output, PathBuf::from("result.json"));
        assert!(!args.headless);
        assert_eq!(args.user_agent, dscr::scrape::USER_AGENT);
    }

    #[test]
    fn target_is_lenient() {
        for (raw, expected) in [
            ("12", 12),
            ("lots", 40),
            ("-3", 40),
            ("0", 40),
            ("1e2", 100),
            ("10.0", 10),
        ] {
            let args = Args::try_parse_from(["discovery", raw]).unwrap();
            assert_eq!(
                dscr::util::lenient_count(args.target.as_deref(), DEFAULT_TARGET),
                expected,
            );
        }
    }

    #[test]
    fn options_after_target() {
        let args =
            Args::try_parse_from(["discovery", "5", "--headless", "-o", "out.json"]).unwrap();
        assert_eq!(args.target.as_deref(), Some("5"));
        assert!(args.headless);
        assert_eq!(args.output, PathBuf::from("out.json"));
    }
}
