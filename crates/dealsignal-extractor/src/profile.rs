//! Firm profile extraction from website or document text

use crate::patterns::{
    self, normalize_market_unit, AUM_AFTER, AUM_BEFORE, CHECK_SIZE, CRUNCHBASE, EMAIL, FOUNDED,
    GROWTH_STAGE, LINKEDIN, LOCATION, PHONE, SEED_STAGE, SERIES_STAGE, TWITTER,
};
use dealsignal_domain::ProfileEnrichment;
use regex::Regex;

/// Path segments on x.com / twitter.com that are not handles
const TWITTER_SKIP: &[&str] = &["intent", "share", "hashtag", "search", "i", "home"];

/// Pulls firm profile fields out of free text
///
/// Name and description are not inferred from body text; the crawler fills
/// them from page metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileExtractor;

impl ProfileExtractor {
    /// Create a profile extractor
    pub fn new() -> Self {
        Self
    }

    /// Extract every profile field found in `text`
    pub fn extract(&self, text: &str) -> ProfileEnrichment {
        ProfileEnrichment {
            name: None,
            description: None,
            focus_sectors: patterns::all_labels(patterns::sectors(), text),
            stages: stages(text),
            aum: aum(text),
            check_size: check_size(text),
            location: location(text),
            founded_year: founded_year(text),
            emails: emails(text),
            phones: unique_matches(PHONE.as_ref(), text),
            linkedin_url: first_match(LINKEDIN.as_ref(), text),
            twitter_url: twitter(text),
            crunchbase_url: first_match(CRUNCHBASE.as_ref(), text),
        }
    }
}

fn first_match(re: Option<&Regex>, text: &str) -> Option<String> {
    re.and_then(|re| re.find(text))
        .map(|m| m.as_str().trim_end_matches('/').to_string())
}

fn unique_matches(re: Option<&Regex>, text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    if let Some(re) = re {
        for m in re.find_iter(text) {
            let value = m.as_str().trim().to_string();
            if !found.contains(&value) {
                found.push(value);
            }
        }
    }
    found
}

fn money(value: &str, unit: &str) -> Option<String> {
    let unit = normalize_market_unit(unit)?;
    Some(format!("${}{}", value.replace(',', ""), &unit[1..]))
}

fn aum(text: &str) -> Option<String> {
    [AUM_BEFORE.as_ref(), AUM_AFTER.as_ref()]
        .into_iter()
        .flatten()
        .filter_map(|re| re.captures(text))
        .min_by_key(|caps| caps.get(0).map_or(usize::MAX, |m| m.start()))
        .and_then(|caps| money(caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

fn scale_suffix(token: Option<&str>) -> Option<&'static str> {
    match token?.to_ascii_lowercase().as_str() {
        "k" | "thousand" => Some("K"),
        "m" | "million" => Some("M"),
        "b" | "billion" => Some("B"),
        _ => None,
    }
}

fn check_size(text: &str) -> Option<String> {
    let caps = CHECK_SIZE.as_ref()?.captures(text)?;
    let low = caps.get(1)?.as_str();
    let high = caps.get(3)?.as_str();
    let high_unit = scale_suffix(caps.get(4).map(|m| m.as_str()))?;
    // "$1-3M" means both ends are in millions
    let low_unit = scale_suffix(caps.get(2).map(|m| m.as_str())).unwrap_or(high_unit);
    Some(format!("${}{}-${}{}", low, low_unit, high, high_unit))
}

fn stages(text: &str) -> Vec<String> {
    let mut stages = Vec::new();
    if let Some(re) = SEED_STAGE.as_ref() {
        let (mut pre_seed, mut seed) = (false, false);
        for caps in re.captures_iter(text) {
            if caps.get(1).is_some() {
                pre_seed = true;
            } else {
                seed = true;
            }
        }
        if pre_seed {
            stages.push("Pre-Seed".to_string());
        }
        if seed {
            stages.push("Seed".to_string());
        }
    }
    if let Some(re) = SERIES_STAGE.as_ref() {
        let mut letters: Vec<char> = re
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| m.as_str().chars().next())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        letters.sort_unstable();
        letters.dedup();
        stages.extend(letters.into_iter().map(|c| format!("Series {}", c)));
    }
    if GROWTH_STAGE.as_ref().is_some_and(|re| re.is_match(text)) {
        stages.push("Growth".to_string());
    }
    stages
}

fn location(text: &str) -> Option<String> {
    let caps = LOCATION.as_ref()?.captures(text)?;
    let place = caps.get(1)?.as_str().trim().trim_end_matches(',').trim();
    (!place.is_empty()).then(|| place.to_string())
}

fn founded_year(text: &str) -> Option<u16> {
    let caps = FOUNDED.as_ref()?.captures(text)?;
    caps.get(1)?.as_str().parse().ok()
}

fn emails(text: &str) -> Vec<String> {
    const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];
    unique_matches(EMAIL.as_ref(), text)
        .into_iter()
        .map(|e| e.trim_end_matches('.').to_lowercase())
        .filter(|e| !ASSET_SUFFIXES.iter().any(|s| e.ends_with(s)))
        .fold(Vec::new(), |mut acc, e| {
            if !acc.contains(&e) {
                acc.push(e);
            }
            acc
        })
}

fn twitter(text: &str) -> Option<String> {
    let re = TWITTER.as_ref()?;
    re.captures_iter(text)
        .find(|caps| {
            caps.get(1)
                .is_some_and(|h| !TWITTER_SKIP.contains(&h.as_str().to_lowercase().as_str()))
        })
        .and_then(|caps| caps.get(0))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRM_PAGE: &str = "Northwind Ventures is an early-stage fund based in San Francisco, CA. \
        Founded in 2014, we manage $1.2 billion in AUM and write checks of $500K to $2M \
        at the pre-seed, seed and Series A stages. We back fintech and climate founders. \
        Reach us at Hello@Northwind.vc or (415) 555-0100. \
        https://www.linkedin.com/company/northwind-ventures/ \
        https://twitter.com/intent/tweet https://x.com/northwindvc \
        https://www.crunchbase.com/organization/northwind-ventures";

    #[test]
    fn test_extracts_full_profile() {
        let profile = ProfileExtractor::new().extract(FIRM_PAGE);

        assert_eq!(profile.aum.as_deref(), Some("$1.2B"));
        assert_eq!(profile.check_size.as_deref(), Some("$500K-$2M"));
        assert_eq!(profile.location.as_deref(), Some("San Francisco, CA"));
        assert_eq!(profile.founded_year, Some(2014));
        assert_eq!(profile.stages, vec!["Pre-Seed", "Seed", "Series A"]);
        assert_eq!(profile.focus_sectors, vec!["Fintech", "Climate"]);
        assert_eq!(profile.emails, vec!["hello@northwind.vc"]);
        assert_eq!(profile.phones, vec!["(415) 555-0100"]);
        assert_eq!(
            profile.linkedin_url.as_deref(),
            Some("https://www.linkedin.com/company/northwind-ventures")
        );
        assert_eq!(profile.twitter_url.as_deref(), Some("https://x.com/northwindvc"));
        assert_eq!(
            profile.crunchbase_url.as_deref(),
            Some("https://www.crunchbase.com/organization/northwind-ventures")
        );
        assert_eq!(profile.name, None);
    }

    #[test]
    fn test_empty_text_yields_empty_enrichment() {
        assert!(ProfileExtractor::new().extract("").is_empty());
        assert!(ProfileExtractor::new()
            .extract("We like to go hiking on weekends.")
            .is_empty());
    }

    #[test]
    fn test_aum_after_keyword() {
        let profile = ProfileExtractor::new().extract("Assets under management: $850 million.");
        assert_eq!(profile.aum.as_deref(), Some("$850M"));
    }

    #[test]
    fn test_check_size_shared_unit() {
        let profile = ProfileExtractor::new().extract("We invest $1-3M in each company.");
        assert_eq!(profile.check_size.as_deref(), Some("$1M-$3M"));
    }

    #[test]
    fn test_growth_and_later_series() {
        let profile =
            ProfileExtractor::new().extract("We lead Series C and series B rounds and growth equity deals.");
        assert_eq!(profile.stages, vec!["Series B", "Series C", "Growth"]);
    }

    #[test]
    fn test_image_addresses_are_not_emails() {
        let profile = ProfileExtractor::new().extract("logo@2x.png team@fund.com");
        assert_eq!(profile.emails, vec!["team@fund.com"]);
    }
}
