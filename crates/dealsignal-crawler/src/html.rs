//! Regex heuristics over raw HTML
//!
//! No DOM is built. These helpers are tuned for the marketing pages of
//! investment firms and startups, where the interesting facts sit in plain
//! paragraphs, the `<title>` and the meta description.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static TITLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").ok());

static META_NAME_FIRST: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<meta\s+[^>]*?(?:name|property)\s*=\s*["'](?:og:)?description["'][^>]*?\scontent\s*=\s*["']([^"']*)["']"#,
    )
    .ok()
});

static META_CONTENT_FIRST: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<meta\s+[^>]*?content\s*=\s*["']([^"']*)["'][^>]*?\s(?:name|property)\s*=\s*["'](?:og:)?description["']"#,
    )
    .ok()
});

static HIDDEN_BLOCKS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<head\b[^>]*>.*?</head\s*>|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<noscript\b[^>]*>.*?</noscript\s*>|<!--.*?-->",
    )
    .ok()
});

static BLOCK_TAGS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|br|li|ul|ol|h[1-6]|tr|table|section|article|header|footer|nav|main|blockquote)\b[^>]*>",
    )
    .ok()
});

static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

static ANY_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").ok());

static NUMERIC_ENTITY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));").ok());

static HREF: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#).ok());

fn replace_all(re: &Option<Regex>, text: &str, with: &str) -> String {
    match re {
        Some(re) => re.replace_all(text, with).into_owned(),
        None => text.to_string(),
    }
}

/// Decode numeric and the common named HTML entities
pub fn decode_entities(text: &str) -> String {
    let text = match NUMERIC_ENTITY.as_ref() {
        Some(re) => re
            .replace_all(text, |caps: &regex::Captures| {
                let code = match (caps.get(1), caps.get(2)) {
                    (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                    (_, Some(dec)) => dec.as_str().parse().ok(),
                    _ => None,
                };
                code.and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_default()
            })
            .into_owned(),
        None => text.to_string(),
    };

    // &amp; last so "&amp;lt;" decodes to "&lt;" and not "<"
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&ndash;", "–")
        .replace("&mdash;", "—")
        .replace("&amp;", "&")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean(raw: &str) -> Option<String> {
    let value = collapse_whitespace(&decode_entities(raw));
    (!value.is_empty()).then_some(value)
}

/// The page `<title>`, decoded and whitespace-collapsed
pub fn title(html: &str) -> Option<String> {
    TITLE
        .as_ref()?
        .captures(html)
        .and_then(|caps| clean(&replace_all(&ANY_TAG, &caps[1], " ")))
}

/// The `description` (or `og:description`) meta tag
pub fn meta_description(html: &str) -> Option<String> {
    [&META_NAME_FIRST, &META_CONTENT_FIRST]
        .into_iter()
        .filter_map(|re| re.as_ref())
        .find_map(|re| re.captures(html))
        .and_then(|caps| clean(&caps[1]))
}

/// Human-visible text with one paragraph per block element
///
/// The head, scripts, styles, noscript blocks and comments are dropped; remaining tags
/// are stripped and entities decoded. Paragraphs are separated by blank lines.
pub fn visible_text(html: &str) -> String {
    let text = replace_all(&HIDDEN_BLOCKS, html, " ");
    // Source line breaks carry no meaning; only block elements do
    let text = replace_all(&WHITESPACE, &text, " ");
    let text = replace_all(&BLOCK_TAGS, &text, "\n");
    let text = replace_all(&ANY_TAG, &text, " ");
    let text = decode_entities(&text);

    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Absolute http(s) links on the same host as `base`, deduplicated, fragments removed
pub fn same_host_links(html: &str, base: &Url) -> Vec<Url> {
    let Some(re) = HREF.as_ref() else {
        return Vec::new();
    };

    let mut links: Vec<Url> = Vec::new();
    for caps in re.captures_iter(html) {
        let raw = decode_entities(caps[1].trim());
        if raw.starts_with("mailto:") || raw.starts_with("tel:") || raw.starts_with("javascript:") {
            continue;
        }
        let Ok(mut link) = base.join(&raw) else {
            continue;
        };
        if !matches!(link.scheme(), "http" | "https") || link.host_str() != base.host_str() {
            continue;
        }
        link.set_fragment(None);
        if !links.contains(&link) {
            links.push(link);
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head>
  <title>
    Northwind Ventures &amp; Co | Seed Fund
  </title>
  <meta name="description" content="Early-stage fund backing fintech &amp; climate founders.">
  <style>body { color: red; }</style>
  <script>var tracking = "AUM $999B";</script>
</head>
<body>
  <nav><a href="/about">About</a> <a href="/team#partners">Team</a> <a href="https://twitter.com/northwind">X</a></nav>
  <!-- <p>Hidden $5B fund</p> -->
  <h1>We invest early</h1>
  <p>Based in Austin, TX.  We manage
     $300 million.</p>
  <a href="mailto:hi@northwind.vc">Email</a>
  <a href="/about">About again</a>
</body></html>"#;

    #[test]
    fn test_title_is_decoded_and_collapsed() {
        assert_eq!(
            title(PAGE).as_deref(),
            Some("Northwind Ventures & Co | Seed Fund")
        );
        assert_eq!(title("<html><title>   </title></html>"), None);
    }

    #[test]
    fn test_meta_description_either_attribute_order() {
        assert_eq!(
            meta_description(PAGE).as_deref(),
            Some("Early-stage fund backing fintech & climate founders.")
        );
        let reversed = r#"<meta content="Growth equity" property="og:description">"#;
        assert_eq!(meta_description(reversed).as_deref(), Some("Growth equity"));
        assert_eq!(meta_description("<p>no meta</p>"), None);
    }

    #[test]
    fn test_visible_text_drops_hidden_content() {
        let text = visible_text(PAGE);
        assert!(text.contains("We invest early"));
        assert!(!text.contains("Seed Fund"));
        assert!(text.contains("Based in Austin, TX. We manage $300 million."));
        assert!(!text.contains("$999B"));
        assert!(!text.contains("$5B"));
        assert!(!text.contains("color: red"));
        assert!(text.contains("\n\n"));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp;lt; b"), "a &lt; b");
        assert_eq!(decode_entities("&#36;2B &#x2014; &quot;x&quot;"), "$2B — \"x\"");
        assert_eq!(decode_entities("&#xZZ; stays"), "&#xZZ; stays");
    }

    #[test]
    fn test_same_host_links() {
        let base = Url::parse("https://northwind.vc/").unwrap();
        let links: Vec<String> = same_host_links(PAGE, &base)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            links,
            vec!["https://northwind.vc/about", "https://northwind.vc/team"]
        );
    }
}
