//! Data types produced by the validation and aggregation passes.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::analyzers::classify::InquiryCategory;
use crate::record::RawRecord;

/// A trimmed row that passed every validity predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedLead {
    pub record: RawRecord,
    pub category: InquiryCategory,
    pub timestamp: Option<NaiveDateTime>,
    pub query_preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityCount {
    pub name: String,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub code: String,
    pub name: String,
    pub count: usize,
    pub percentage: u32,
    pub flag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: InquiryCategory,
    pub count: usize,
    pub percentage: u32,
}

/// One bucket of the trailing-12-month series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`
    pub month_key: String,
    /// `Aug 2024`
    pub label: String,
    pub responses: usize,
}

/// Scalar figures derived from the monthly series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrendStats {
    pub window_total: usize,
    pub last_quarter: usize,
    pub peak_month: usize,
    pub monthly_average: usize,
}

/// Everything the dashboard shows for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateSummary {
    /// Valid responses after filtering.
    pub total_responses: usize,
    /// Data rows in the export before filtering.
    pub total_raw: usize,
    pub time_range: String,
    pub top_cities: Vec<CityCount>,
    /// Every counted city, in first-seen order.
    pub all_cities: Vec<CityCount>,
    pub countries: Vec<CountryCount>,
    /// Non-zero categories only, in priority order.
    pub query_types: Vec<CategoryCount>,
    pub monthly_trend: Vec<MonthlyCount>,
    pub trend: TrendStats,
    pub insights: Vec<String>,
}

impl AggregateSummary {
    pub fn category_count(&self, category: InquiryCategory) -> usize {
        self.query_types
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.count)
    }
}

/// Display projection of a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadRow {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub query: String,
    pub city: String,
    pub category: String,
    /// `DD-MM-YYYY` or `N/A`
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadPage {
    pub rows: Vec<LeadRow>,
    /// 1-based
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}
