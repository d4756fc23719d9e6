//! Runtime configuration.
//!
//! Every threshold the pipeline uses lives here instead of in scattered
//! literals. All sections are optional in the TOML file; missing keys fall
//! back to the defaults below.
//!
//! ```toml
//! [source]
//! sheet_id = "1AbC..."
//!
//! [refresh]
//! interval_secs = 300
//!
//! [pipeline]
//! header_mapping = "positional"
//!
//! [pipeline.validation]
//! min_query_chars = 5
//! ```

use serde::{Deserialize, Serialize};
use std::fs;

use crate::analyzers::classify::InquiryCategory;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub refresh: RefreshConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Loads the config from a TOML file at `path`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

/// Where the CSV export comes from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Explicit export URL or file path; takes precedence over `sheet_id`.
    pub url: Option<String>,
    pub base_url: String,
    pub sheet_id: Option<String>,
    pub gid: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            base_url: "https://docs.google.com".to_string(),
            sheet_id: None,
            gid: 0,
        }
    }
}

impl SourceConfig {
    /// Resolves the location to fetch, if one is configured.
    pub fn export_url(&self) -> Option<String> {
        if let Some(url) = &self.url {
            return Some(url.clone());
        }
        self.sheet_id.as_ref().map(|id| {
            format!(
                "{}/spreadsheets/d/{}/export?format=csv&gid={}",
                self.base_url.trim_end_matches('/'),
                id,
                self.gid
            )
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Publish the demo snapshot when a fetch yields zero valid records.
    pub fallback_on_empty: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            fetch_timeout_secs: 30,
            connect_timeout_secs: 10,
            fallback_on_empty: true,
        }
    }
}

/// How data columns are matched to [`crate::record::Field`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMapping {
    /// Match header names; falls back to positional when none match.
    #[default]
    ByName,
    /// Column `i` is field `i` regardless of the header text.
    Positional,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub header_mapping: HeaderMapping,
    pub validation: ValidationConfig,
    /// Checked in order; the first rule with a matching keyword wins.
    pub categories: Vec<CategoryRule>,
    pub aggregation: AggregationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            header_mapping: HeaderMapping::default(),
            validation: ValidationConfig::default(),
            categories: default_categories(),
            aggregation: AggregationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_name_chars: usize,
    pub email_denylist: Vec<String>,
    pub email_denied_substrings: Vec<String>,
    pub min_query_chars: usize,
    /// Case-insensitive regexes matched against the trimmed query.
    pub query_deny_patterns: Vec<String>,
    pub gibberish_ratio: usize,
    pub gibberish_min_consonants: usize,
    pub preview_chars: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_name_chars: 3,
            email_denylist: vec![
                "faudev@fattudev.in".to_string(),
                "fattudev@fattudev.in".to_string(),
            ],
            email_denied_substrings: vec!["test".into(), "fake".into(), "spam".into()],
            min_query_chars: 8,
            query_deny_patterns: vec![
                r"^(hi+|hello+|hey+|helo|hlo|ok+|okay|yes|no|thanks|thank you|thx|test|testing|hmm+|nil|none|na|n/a)[\s.!?]*$".into(),
                r"^[\d\s\W_]+$".into(),
                r"^[a-z]\W*$".into(),
                r"^(asdf|qwer|zxcv|jkl)+\w{0,4}$".into(),
            ],
            gibberish_ratio: 3,
            gibberish_min_consonants: 10,
            preview_chars: 80,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryRule {
    pub category: InquiryCategory,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    fn new(category: InquiryCategory, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

pub fn default_categories() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            InquiryCategory::PurchaseInquiry,
            &[
                "buy",
                "purchase",
                "price",
                "dashcam",
                "want to buy",
                "cost",
                "order",
                "quotation",
            ],
        ),
        CategoryRule::new(
            InquiryCategory::BusinessPartnership,
            &[
                "partnership",
                "business",
                "collaboration",
                "distribution",
                "dealer",
                "reseller",
                "distributor",
            ],
        ),
        CategoryRule::new(
            InquiryCategory::JobInternship,
            &[
                "job",
                "internship",
                "career",
                "hiring",
                "opportunity",
                "resume",
                "vacancy",
            ],
        ),
        CategoryRule::new(
            InquiryCategory::InvestmentFunding,
            &["funding", "investment", "venture", "capital", "investor"],
        ),
        CategoryRule::new(
            InquiryCategory::TechnicalSupport,
            &[
                "support",
                "not working",
                "issue",
                "problem",
                "installation",
                "repair",
                "warranty",
            ],
        ),
        CategoryRule::new(
            InquiryCategory::FleetManagement,
            &["fleet", "trucks", "logistics", "tracking", "vehicles"],
        ),
    ]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CountryEntry {
    pub code: String,
    pub name: String,
    pub flag: String,
}

impl CountryEntry {
    fn new(code: &str, name: &str, flag: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            flag: flag.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub top_cities: usize,
    pub city_min_chars: usize,
    pub city_sentinels: Vec<String>,
    /// Codes outside this table are left out of the country breakdown.
    pub countries: Vec<CountryEntry>,
    pub recent_leads: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            top_cities: 10,
            city_min_chars: 3,
            city_sentinels: vec!["English".into(), "language".into()],
            countries: vec![
                CountryEntry::new("IN", "India", "🇮🇳"),
                CountryEntry::new("IT", "Italy", "🇮🇹"),
                CountryEntry::new("SG", "Singapore", "🇸🇬"),
                CountryEntry::new("US", "USA", "🇺🇸"),
                CountryEntry::new("CA", "Canada", "🇨🇦"),
                CountryEntry::new("UK", "United Kingdom", "🇬🇧"),
            ],
            recent_leads: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_url_from_sheet_id() {
        let source = SourceConfig {
            sheet_id: Some("abc123".into()),
            ..Default::default()
        };
        assert_eq!(
            source.export_url().as_deref(),
            Some("https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=0")
        );
    }

    #[test]
    fn test_explicit_url_wins() {
        let source = SourceConfig {
            url: Some("data/responses.csv".into()),
            sheet_id: Some("abc123".into()),
            ..Default::default()
        };
        assert_eq!(source.export_url().as_deref(), Some("data/responses.csv"));
    }

    #[test]
    fn test_no_source_configured() {
        assert!(SourceConfig::default().export_url().is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [refresh]
            interval_secs = 60

            [pipeline]
            header_mapping = "positional"

            [pipeline.validation]
            min_query_chars = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.refresh.interval_secs, 60);
        assert_eq!(config.refresh.fetch_timeout_secs, 30);
        assert_eq!(config.pipeline.header_mapping, HeaderMapping::Positional);
        assert_eq!(config.pipeline.validation.min_query_chars, 5);
        assert_eq!(config.pipeline.validation.min_name_chars, 3);
        assert_eq!(config.pipeline.categories.len(), 6);
        assert_eq!(config.pipeline.aggregation.top_cities, 10);
    }

    #[test]
    fn test_category_table_from_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [[pipeline.categories]]
            category = "Technical Support"
            keywords = ["broken"]
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.categories.len(), 1);
        assert_eq!(
            config.pipeline.categories[0].category,
            InquiryCategory::TechnicalSupport
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
