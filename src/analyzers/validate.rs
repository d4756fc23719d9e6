//! Row validity predicates, normalization and classification.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

use crate::analyzers::classify::classify;
use crate::analyzers::types::ValidatedLead;
use crate::analyzers::utility::{is_devanagari, latin_letter_counts, preview};
use crate::config::{CategoryRule, PipelineConfig, ValidationConfig};
use crate::dates::parse_timestamp;
use crate::error::ConfigError;
use crate::record::RawRecord;

/// Why a query was judged implausible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueryDefect {
    TooShort,
    DeniedPattern,
    NoLetters,
    Gibberish,
}

/// First predicate a row failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rejection {
    Name,
    Email,
    Query(QueryDefect),
}

/// Per-predicate drop counters for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    pub name: usize,
    pub email: usize,
    pub query: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.name + self.email + self.query
    }

    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Name => self.name += 1,
            Rejection::Email => self.email += 1,
            Rejection::Query(_) => self.query += 1,
        }
    }
}

/// Leads that passed every predicate plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub leads: Vec<ValidatedLead>,
    pub dropped: DropCounts,
}

/// Compiled form of [`ValidationConfig`] and the category table.
#[derive(Debug, Clone)]
pub struct Validator {
    rules: ValidationConfig,
    email_denylist: Vec<String>,
    deny_patterns: Vec<Regex>,
    categories: Vec<CategoryRule>,
}

impl Validator {
    /// # Errors
    ///
    /// Returns an error if a query deny pattern is not a valid regex.
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let deny_patterns = config
            .validation
            .query_deny_patterns
            .iter()
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;

        let email_denylist = config
            .validation
            .email_denylist
            .iter()
            .map(|e| e.trim().to_lowercase())
            .collect();

        Ok(Self {
            rules: config.validation.clone(),
            email_denylist,
            deny_patterns,
            categories: config.categories.clone(),
        })
    }

    pub fn check_name(&self, name: &str) -> bool {
        let name = name.trim();
        name.chars().count() >= self.rules.min_name_chars && !name.eq_ignore_ascii_case("name")
    }

    pub fn check_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase().replace('"', "");

        if self.email_denylist.iter().any(|e| *e == email) {
            return false;
        }
        if self
            .rules
            .email_denied_substrings
            .iter()
            .any(|s| !s.is_empty() && email.contains(&s.to_lowercase()))
        {
            return false;
        }
        email.is_empty() || email.contains('@')
    }

    pub fn check_query(&self, query: &str) -> Result<(), QueryDefect> {
        let query = query.trim();

        if query.chars().count() < self.rules.min_query_chars {
            return Err(QueryDefect::TooShort);
        }
        if self.deny_patterns.iter().any(|re| re.is_match(query)) {
            return Err(QueryDefect::DeniedPattern);
        }

        let has_devanagari = query.chars().any(is_devanagari);
        if !has_devanagari && !query.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(QueryDefect::NoLetters);
        }
        if has_devanagari {
            return Ok(());
        }

        let (vowels, consonants) = latin_letter_counts(query);
        if consonants > self.rules.gibberish_ratio * vowels
            && consonants > self.rules.gibberish_min_consonants
        {
            return Err(QueryDefect::Gibberish);
        }

        Ok(())
    }

    /// Runs every predicate against `raw` and builds the lead on success.
    pub fn validate_record(&self, raw: &RawRecord) -> Result<ValidatedLead, Rejection> {
        let record = raw.trimmed();

        if !self.check_name(&record.name) {
            return Err(Rejection::Name);
        }
        if !self.check_email(&record.email) {
            return Err(Rejection::Email);
        }
        self.check_query(&record.query).map_err(Rejection::Query)?;

        let category = classify(&record.query, &self.categories);
        let timestamp = parse_timestamp(&record.timestamp);
        let query_preview = preview(&record.query, self.rules.preview_chars);

        Ok(ValidatedLead {
            record,
            category,
            timestamp,
            query_preview,
        })
    }

    /// Filters a batch, keeping input order.
    pub fn validate(&self, records: &[RawRecord]) -> Validation {
        let mut out = Validation::default();

        for raw in records {
            match self.validate_record(raw) {
                Ok(lead) => out.leads.push(lead),
                Err(rejection) => {
                    debug!(?rejection, name = %raw.name.trim(), "Row dropped");
                    out.dropped.record(rejection);
                }
            }
        }

        debug!(
            kept = out.leads.len(),
            dropped_name = out.dropped.name,
            dropped_email = out.dropped.email,
            dropped_query = out.dropped.query,
            "Validation finished"
        );
        out
    }
}
