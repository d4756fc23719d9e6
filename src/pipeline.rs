//! Parse, validate and aggregate one export.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::analyzers::aggregate::summarize;
use crate::analyzers::leads::sort_latest_first;
use crate::analyzers::types::{AggregateSummary, ValidatedLead};
use crate::analyzers::validate::{DropCounts, Validator};
use crate::config::PipelineConfig;
use crate::error::{ConfigError, FetchError, PipelineError};
use crate::parser::parse_sheet;
use crate::snapshot::Snapshot;

/// Result of one pass over an export.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub summary: AggregateSummary,
    /// Newest first.
    pub leads: Vec<ValidatedLead>,
    pub dropped: DropCounts,
    /// `false` when the blob had no header line at all.
    pub has_header: bool,
}

/// Configured pipeline. Holds no state between runs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    validator: Validator,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        let validator = Validator::new(&config)?;
        Ok(Self { config, validator })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage over `text`. `today` anchors the monthly window.
    ///
    /// Never fails: malformed rows are dropped and counted, and an empty or
    /// header-only export yields an empty summary.
    pub fn analyze(&self, text: &str, today: NaiveDate) -> PipelineOutput {
        let sheet = parse_sheet(text, self.config.header_mapping);
        let validation = self.validator.validate(&sheet.records);

        let mut leads = validation.leads;
        let summary = summarize(&leads, sheet.raw_count(), today, &self.config);
        sort_latest_first(&mut leads);

        info!(
            raw = sheet.raw_count(),
            valid = summary.total_responses,
            dropped = validation.dropped.total(),
            cities = summary.all_cities.len(),
            countries = summary.countries.len(),
            "Analysis complete"
        );

        PipelineOutput {
            summary,
            leads,
            dropped: validation.dropped,
            has_header: !sheet.headers.is_empty(),
        }
    }

    /// Checks batch shape; `require_records` rejects a run with no valid leads.
    pub fn check(output: &PipelineOutput, require_records: bool) -> Result<(), PipelineError> {
        if !output.has_header {
            return Err(PipelineError::EmptyInput);
        }
        if require_records && output.summary.total_responses == 0 {
            return Err(PipelineError::NoValidRecords {
                raw: output.summary.total_raw,
            });
        }
        Ok(())
    }

    /// Turns a fetch result into the snapshot to publish, substituting the
    /// demonstration snapshot on any transport or shape error.
    pub fn snapshot(
        &self,
        fetched: Result<String, FetchError>,
        now: DateTime<Utc>,
        fallback_on_empty: bool,
    ) -> Snapshot {
        let today = now.date_naive();
        let recent = self.config.aggregation.recent_leads;

        let text = match fetched {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Fetch failed, publishing demo snapshot");
                return Snapshot::demo(e.to_string(), now);
            }
        };

        let output = self.analyze(&text, today);
        match Self::check(&output, fallback_on_empty) {
            Ok(()) => Snapshot::live(output, now, recent),
            Err(e) => {
                warn!(error = %e, "Unusable export, publishing demo snapshot");
                Snapshot::demo(e.to_string(), now)
            }
        }
    }
}
