//! The value handed to the presentation layer after each refresh.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::aggregate::{trailing_months, trend_stats};
use crate::analyzers::classify::InquiryCategory;
use crate::analyzers::types::{
    AggregateSummary, CategoryCount, CityCount, CountryCount, LeadRow, MonthlyCount, TrendStats,
    ValidatedLead,
};
use crate::analyzers::leads::recent_leads;
use crate::analyzers::utility::pct;
use crate::analyzers::validate::DropCounts;
use crate::dates::{month_key, month_label};
use crate::pipeline::PipelineOutput;

/// Whether a snapshot reflects fetched data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotStatus {
    Live,
    /// Placeholder figures published because the last refresh failed.
    Demo { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub status: SnapshotStatus,
    pub summary: AggregateSummary,
    /// Newest first. Empty for demo snapshots.
    pub leads: Vec<ValidatedLead>,
    pub recent_leads: Vec<LeadRow>,
    pub dropped: DropCounts,
}

impl Snapshot {
    pub fn live(output: PipelineOutput, now: DateTime<Utc>, recent_limit: usize) -> Self {
        let recent_leads = recent_leads(&output.leads, recent_limit);
        Self {
            generated_at: now,
            status: SnapshotStatus::Live,
            summary: output.summary,
            leads: output.leads,
            recent_leads,
            dropped: output.dropped,
        }
    }

    /// Fixed demonstration figures, clearly flagged as such.
    pub fn demo(reason: String, now: DateTime<Utc>) -> Self {
        Self {
            generated_at: now,
            summary: demo_summary(&reason, now),
            status: SnapshotStatus::Demo { reason },
            leads: Vec::new(),
            recent_leads: vec![LeadRow::placeholder(
                "Sheet Access Error",
                "Make the sheet public to see live data",
            )],
            dropped: DropCounts::default(),
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self.status, SnapshotStatus::Demo { .. })
    }
}

/// Monthly counts of the demo series, oldest first; the last three months
/// carry the sample figures.
const DEMO_MONTHLY: [usize; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 15, 25, 10];

/// Responses behind the demo breakdowns. Category counts sum to it.
const DEMO_TOTAL: usize = 113;

fn demo_summary(reason: &str, now: DateTime<Utc>) -> AggregateSummary {
    let total = DEMO_TOTAL;

    let city = |name: &str, count: usize| CityCount {
        name: name.to_string(),
        count,
        percentage: pct(count, total),
    };
    let top_cities = vec![city("Bengaluru", 32), city("Hyderabad", 8), city("Mumbai", 7)];

    let country = |code: &str, name: &str, flag: &str, count: usize| CountryCount {
        code: code.to_string(),
        name: name.to_string(),
        count,
        percentage: pct(count, total),
        flag: flag.to_string(),
    };

    let category = |category: InquiryCategory, count: usize| CategoryCount {
        category,
        count,
        percentage: pct(count, total),
    };

    let monthly_trend: Vec<MonthlyCount> = trailing_months(now.date_naive())
        .into_iter()
        .zip(DEMO_MONTHLY)
        .map(|(d, responses)| MonthlyCount {
            month_key: month_key(d),
            label: month_label(d),
            responses,
        })
        .collect();
    let trend: TrendStats = trend_stats(&monthly_trend);

    AggregateSummary {
        total_responses: total,
        total_raw: total,
        time_range: "Unable to fetch live customer data - check sheet permissions".to_string(),
        all_cities: top_cities.clone(),
        top_cities,
        countries: vec![
            country("IN", "India", "🇮🇳", 96),
            country("US", "USA", "🇺🇸", 8),
        ],
        query_types: vec![
            category(InquiryCategory::PurchaseInquiry, 73),
            category(InquiryCategory::BusinessPartnership, 29),
            category(InquiryCategory::Others, 11),
        ],
        monthly_trend,
        trend,
        insights: vec![
            format!("Unable to fetch live data: {reason}"),
            "Please ensure the sheet is public (anyone with the link can view)".to_string(),
            "Check that the sheet URL is correct".to_string(),
            "This is sample data for demonstration".to_string(),
        ],
    }
}
