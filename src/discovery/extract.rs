use std::sync::LazyLock;

use compact_str::CompactString;
use hashbrown::HashSet;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use dscr::util::resolve_href;

/// Only links opened from the home feed count as discovery cards.
pub const MARKER: &str = "back-url=home";

static SEL_ARTICLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article").unwrap());
static SEL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="/discovery/"]"#).unwrap());
static SEL_NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2[title]").unwrap());
static SEL_FOOTER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("section.mt-auto").unwrap());
static SEL_BUTTON: LazyLock<Selector> = LazyLock::new(|| Selector::parse("button").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: CompactString,
    pub popularity: CompactString,
    pub url: String,
}

fn trimmed_text(element: ElementRef<'_>) -> CompactString {
    let text = element.text().collect::<String>();
    CompactString::from(text.trim())
}

/// One full pass over `html`. Duplicate links are suppressed within this pass only.
pub fn extract(html: &str, origin: &str) -> Vec<Record> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();

    document
        .select(&SEL_ARTICLE)
        .filter_map(|article| {
            let href = article.select(&SEL_LINK).next()?.attr("href")?;
            if !href.contains(MARKER) || !seen.insert(href) {
                return None;
            }

            let name = trimmed_text(article.select(&SEL_NAME).next()?);
            if name.is_empty() {
                return None;
            }

            let popularity = article
                .select(&SEL_FOOTER)
                .next()
                .and_then(|footer| footer.select(&SEL_BUTTON).next())
                .map(trimmed_text)
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "0".into());

            Some(Record {
                name,
                popularity,
                url: resolve_href(origin, href),
            })
        })
        .collect()
}
