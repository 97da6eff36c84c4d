use url::Url;

/// `scheme://host[:port]` of `url`, the way `window.location.origin` renders it.
pub fn origin_of(url: &str) -> anyhow::Result<String> {
    Ok(Url::parse(url)?.origin().ascii_serialization())
}

pub fn resolve_href(origin: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_owned()
    } else {
        format!("{origin}{href}")
    }
}

/// Reads a number the way JavaScript's `Number()` reads the forms people type:
/// decimals, exponents and `0x`/`0o`/`0b` literals.
fn numeric(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let radix = match s.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => return s.parse().ok(),
    };
    u64::from_str_radix(&s[2..], radix).ok().map(|n| n as f64)
}

/// Parses a count of at least one, rounding fractions down. Anything else means `default`.
pub fn lenient_count(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(numeric)
        .filter(|n| n.is_finite() && *n >= 1.0)
        .map_or(default, |n| n as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_drops_path_and_query() {
        let origin = origin_of("https://app.youmio.ai/discovery/abc?back-url=home").unwrap();
        assert_eq!(origin, "https://app.youmio.ai");

        let origin = origin_of("http://localhost:8080/").unwrap();
        assert_eq!(origin, "http://localhost:8080");
    }

    #[test]
    fn origin_rejects_garbage() {
        assert!(origin_of("not a url").is_err());
    }

    #[test]
    fn relative_href_gets_origin() {
        assert_eq!(
            resolve_href("https://app.youmio.ai", "/discovery/42?back-url=home"),
            "https://app.youmio.ai/discovery/42?back-url=home",
        );
    }

    #[test]
    fn absolute_href_is_kept() {
        let href = "https://other.example/discovery/1?back-url=home";
        assert_eq!(resolve_href("https://app.youmio.ai", href), href);
    }

    #[test]
    fn count_falls_back() {
        assert_eq!(lenient_count(None, 40), 40);
        assert_eq!(lenient_count(Some("abc"), 40), 40);
        assert_eq!(lenient_count(Some("0"), 40), 40);
        assert_eq!(lenient_count(Some("-5"), 40), 40);
        assert_eq!(lenient_count(Some(""), 40), 40);
        assert_eq!(lenient_count(Some("100"), 40), 100);
        assert_eq!(lenient_count(Some(" 7 "), 40), 7);
        assert_eq!(lenient_count(Some("0.5"), 40), 40);
        assert_eq!(lenient_count(Some("NaN"), 40), 40);
        assert_eq!(lenient_count(Some("inf"), 40), 40);
        assert_eq!(lenient_count(Some("0x"), 40), 40);
    }

    #[test]
    fn count_reads_numeric_forms() {
        assert_eq!(lenient_count(Some("1e2"), 40), 100);
        assert_eq!(lenient_count(Some("10.0"), 40), 10);
        assert_eq!(lenient_count(Some("0x10"), 40), 16);
        assert_eq!(lenient_count(Some("0b101"), 40), 5);
        assert_eq!(lenient_count(Some("+12"), 40), 12);
        assert_eq!(lenient_count(Some("3.7"), 40), 3);
    }
}
