//! Firm profiles - enrichment targets filled in by crawler and extractor runs

/// Scalar facts discovered about a firm during one enrichment run
///
/// Every field is optional; an empty list or `None` means "not found this run".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileEnrichment {
    /// Display name
    pub name: Option<String>,
    /// Short description (usually the page's meta description)
    pub description: Option<String>,
    /// Focus sectors
    pub focus_sectors: Vec<String>,
    /// Investment stages
    pub stages: Vec<String>,
    /// Assets under management, e.g. `$2.5B`
    pub aum: Option<String>,
    /// Typical check size, e.g. `$500K-$2M`
    pub check_size: Option<String>,
    /// Headquarters location
    pub location: Option<String>,
    /// Founding year
    pub founded_year: Option<u16>,
    /// Contact email addresses
    pub emails: Vec<String>,
    /// Contact phone numbers
    pub phones: Vec<String>,
    /// LinkedIn page
    pub linkedin_url: Option<String>,
    /// Twitter / X profile
    pub twitter_url: Option<String>,
    /// Crunchbase page
    pub crunchbase_url: Option<String>,
}

impl ProfileEnrichment {
    /// True when nothing was found
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Number of fields this enrichment would overwrite
    pub fn field_count(&self) -> usize {
        let options = [
            self.name.is_some(),
            self.description.is_some(),
            self.aum.is_some(),
            self.check_size.is_some(),
            self.location.is_some(),
            self.founded_year.is_some(),
            self.linkedin_url.is_some(),
            self.twitter_url.is_some(),
            self.crunchbase_url.is_some(),
        ];
        let lists = [
            &self.focus_sectors,
            &self.stages,
            &self.emails,
            &self.phones,
        ];
        options.iter().filter(|found| **found).count()
            + lists.iter().filter(|l| !l.is_empty()).count()
    }
}

/// Mutable aggregate describing an investment firm or startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirmProfile {
    /// Caller-chosen key (slug or domain)
    pub key: String,
    /// Website the profile was last enriched from
    pub website: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Focus sectors
    pub focus_sectors: Vec<String>,
    /// Investment stages
    pub stages: Vec<String>,
    /// Assets under management
    pub aum: Option<String>,
    /// Typical check size
    pub check_size: Option<String>,
    /// Headquarters location
    pub location: Option<String>,
    /// Founding year
    pub founded_year: Option<u16>,
    /// Contact emails
    pub emails: Vec<String>,
    /// Contact phones
    pub phones: Vec<String>,
    /// LinkedIn page
    pub linkedin_url: Option<String>,
    /// Twitter / X profile
    pub twitter_url: Option<String>,
    /// Crunchbase page
    pub crunchbase_url: Option<String>,
    /// Last enrichment time (ms since Unix epoch)
    pub updated_at: Option<u64>,
}

impl FirmProfile {
    /// Create an empty profile
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Apply an enrichment run
    ///
    /// Last writer wins: every field the enrichment found replaces the stored
    /// value outright. Lists are replaced whole, never unioned. Fields the run
    /// did not find keep their previous value.
    ///
    /// # Examples
    ///
    /// ```
    /// use dealsignal_domain::{FirmProfile, ProfileEnrichment};
    ///
    /// let mut profile = FirmProfile::new("acme-ventures");
    /// profile.focus_sectors = vec!["fintech".into(), "saas".into()];
    ///
    /// let run = ProfileEnrichment {
    ///     focus_sectors: vec!["climate".into()],
    ///     ..Default::default()
    /// };
    /// profile.apply(run, 1_000);
    /// assert_eq!(profile.focus_sectors, vec!["climate".to_string()]);
    /// assert_eq!(profile.updated_at, Some(1_000));
    /// ```
    pub fn apply(&mut self, enrichment: ProfileEnrichment, at: u64) {
        fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        fn overwrite_list(slot: &mut Vec<String>, value: Vec<String>) {
            if !value.is_empty() {
                *slot = value;
            }
        }

        overwrite(&mut self.name, enrichment.name);
        overwrite(&mut self.description, enrichment.description);
        overwrite_list(&mut self.focus_sectors, enrichment.focus_sectors);
        overwrite_list(&mut self.stages, enrichment.stages);
        overwrite(&mut self.aum, enrichment.aum);
        overwrite(&mut self.check_size, enrichment.check_size);
        overwrite(&mut self.location, enrichment.location);
        overwrite(&mut self.founded_year, enrichment.founded_year);
        overwrite_list(&mut self.emails, enrichment.emails);
        overwrite_list(&mut self.phones, enrichment.phones);
        overwrite(&mut self.linkedin_url, enrichment.linkedin_url);
        overwrite(&mut self.twitter_url, enrichment.twitter_url);
        overwrite(&mut self.crunchbase_url, enrichment.crunchbase_url);
        self.updated_at = Some(at);
    }
}
