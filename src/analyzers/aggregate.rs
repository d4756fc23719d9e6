use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::analyzers::classify::InquiryCategory;
use crate::analyzers::insights::key_insights;
use crate::analyzers::types::{
    AggregateSummary, CategoryCount, CityCount, CountryCount, MonthlyCount, TrendStats,
    ValidatedLead,
};
use crate::analyzers::utility::{mean_rounded, pct};
use crate::config::{AggregationConfig, PipelineConfig};
use crate::dates::{month_key, month_label};

/// Length of the monthly series.
pub const TREND_MONTHS: usize = 12;

static IPV4: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").unwrap());
static CITY_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s\-.]+$").unwrap());

/// Counts keys, keeping the order in which each key was first seen.
fn count_first_seen<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }

    counts
}

/// Whether `city` looks like a real place name rather than leaked metadata.
pub fn is_countable_city(city: &str, config: &AggregationConfig) -> bool {
    !city.is_empty()
        && city.chars().count() >= config.city_min_chars
        && !config.city_sentinels.iter().any(|s| s == city)
        && !IPV4.is_match(city)
        && CITY_CHARS.is_match(city)
}

/// Returns `(top, all)`: top is ranked by count and cut to the configured
/// length, all keeps first-seen order.
pub fn city_counts(
    leads: &[ValidatedLead],
    total: usize,
    config: &AggregationConfig,
) -> (Vec<CityCount>, Vec<CityCount>) {
    let all: Vec<CityCount> = count_first_seen(
        leads
            .iter()
            .map(|l| l.record.city.as_str())
            .filter(|c| is_countable_city(c, config)),
    )
    .into_iter()
    .map(|(name, count)| CityCount {
        name,
        count,
        percentage: pct(count, total),
    })
    .collect();

    let mut top = all.clone();
    // stable: ties keep first-seen order
    top.sort_by(|a, b| b.count.cmp(&a.count));
    top.truncate(config.top_cities);

    (top, all)
}

/// Country breakdown over the configured code table; other codes are skipped.
pub fn country_counts(
    leads: &[ValidatedLead],
    total: usize,
    config: &AggregationConfig,
) -> Vec<CountryCount> {
    let mut counts = vec![0usize; config.countries.len()];

    for lead in leads {
        let code = lead.record.country.trim().to_uppercase();
        if let Some(i) = config.countries.iter().position(|c| c.code == code) {
            counts[i] += 1;
        }
    }

    let mut out: Vec<CountryCount> = config
        .countries
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(entry, count)| CountryCount {
            code: entry.code.clone(),
            name: entry.name.clone(),
            count,
            percentage: pct(count, total),
            flag: entry.flag.clone(),
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Per-category counts in priority order with `Others` last, zero rows omitted.
pub fn category_counts(
    leads: &[ValidatedLead],
    total: usize,
    config: &PipelineConfig,
) -> Vec<CategoryCount> {
    // categories missing from a custom table keep their default slot after it
    let mut order: Vec<InquiryCategory> = Vec::new();
    let configured = config.categories.iter().map(|r| r.category);
    for c in configured.chain(InquiryCategory::ALL) {
        if c != InquiryCategory::Others && !order.contains(&c) {
            order.push(c);
        }
    }
    order.push(InquiryCategory::Others);

    order
        .into_iter()
        .map(|category| {
            let count = leads.iter().filter(|l| l.category == category).count();
            CategoryCount {
                category,
                count,
                percentage: pct(count, total),
            }
        })
        .filter(|c| c.count > 0)
        .collect()
}

/// First day of each of the [`TREND_MONTHS`] months ending at `today`.
pub fn trailing_months(today: NaiveDate) -> Vec<NaiveDate> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..TREND_MONTHS as i32)
        .rev()
        .filter_map(|back| {
            let m = current - back;
            NaiveDate::from_ymd_opt(m.div_euclid(12), m.rem_euclid(12) as u32 + 1, 1)
        })
        .collect()
}

/// Trailing-12-month series; undated or out-of-window leads are skipped.
pub fn monthly_series(leads: &[ValidatedLead], today: NaiveDate) -> Vec<MonthlyCount> {
    let mut series: Vec<MonthlyCount> = trailing_months(today)
        .into_iter()
        .map(|d| MonthlyCount {
            month_key: month_key(d),
            label: month_label(d),
            responses: 0,
        })
        .collect();

    for ts in leads.iter().filter_map(|l| l.timestamp) {
        let key = month_key(ts.date());
        if let Some(bucket) = series.iter_mut().find(|m| m.month_key == key) {
            bucket.responses += 1;
        }
    }

    series
}

pub fn trend_stats(series: &[MonthlyCount]) -> TrendStats {
    let counts: Vec<usize> = series.iter().map(|m| m.responses).collect();
    TrendStats {
        window_total: counts.iter().sum(),
        last_quarter: counts.iter().rev().take(3).sum(),
        peak_month: counts.iter().copied().max().unwrap_or(0),
        monthly_average: mean_rounded(&counts),
    }
}

/// Reduces validated leads into the dashboard summary.
///
/// `total_raw` is the number of data rows before filtering and `today`
/// anchors the monthly window.
pub fn summarize(
    leads: &[ValidatedLead],
    total_raw: usize,
    today: NaiveDate,
    config: &PipelineConfig,
) -> AggregateSummary {
    let total = leads.len();
    let (top_cities, all_cities) = city_counts(leads, total, &config.aggregation);
    let countries = country_counts(leads, total, &config.aggregation);
    let query_types = category_counts(leads, total, config);
    let monthly_trend = monthly_series(leads, today);
    let trend = trend_stats(&monthly_trend);

    let mut summary = AggregateSummary {
        total_responses: total,
        total_raw,
        time_range: format!("Customer Response Analytics ({total} valid responses)"),
        top_cities,
        all_cities,
        countries,
        query_types,
        monthly_trend,
        trend,
        insights: Vec::new(),
    };
    summary.insights = key_insights(&summary);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;
    use chrono::NaiveDateTime;

    fn lead(
        city: &str,
        country: &str,
        category: InquiryCategory,
        ts: Option<&str>,
    ) -> ValidatedLead {
        ValidatedLead {
            record: RawRecord {
                name: "Jane Doe".into(),
                city: city.into(),
                country: country.into(),
                ..Default::default()
            },
            category,
            timestamp: ts.map(|s| {
                NaiveDateTime::parse_from_str(&format!("{s} 10:00:00"), "%Y-%m-%d %H:%M:%S")
                    .unwrap()
            }),
            query_preview: String::new(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    #[test]
    fn test_city_filters() {
        let config = AggregationConfig::default();
        assert!(is_countable_city("Bengaluru", &config));
        assert!(is_countable_city("St. Louis", &config));
        assert!(is_countable_city("Navi-Mumbai", &config));
        assert!(!is_countable_city("", &config));
        assert!(!is_countable_city("NY", &config));
        assert!(!is_countable_city("English", &config));
        assert!(!is_countable_city("language", &config));
        assert!(!is_countable_city("192.168.1.10", &config));
        assert!(!is_countable_city("Pune 411001", &config));
        assert!(!is_countable_city("पुणे", &config));
    }

    #[test]
    fn test_city_ranking_is_stable() {
        let leads = vec![
            lead("Pune", "IN", InquiryCategory::Others, None),
            lead("Delhi", "IN", InquiryCategory::Others, None),
            lead("Delhi", "IN", InquiryCategory::Others, None),
            lead("Mumbai", "IN", InquiryCategory::Others, None),
            lead("English", "IN", InquiryCategory::Others, None),
        ];
        let (top, all) = city_counts(&leads, leads.len(), &AggregationConfig::default());

        let names: Vec<_> = top.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Delhi", "Pune", "Mumbai"]);
        assert_eq!(top[0].percentage, 40);
        let all_names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(all_names, vec!["Pune", "Delhi", "Mumbai"]);
    }

    #[test]
    fn test_top_cities_cut() {
        let leads: Vec<_> = ["Aaa", "Bbb", "Ccc", "Ddd"]
            .iter()
            .map(|c| lead(c, "IN", InquiryCategory::Others, None))
            .collect();
        let config = AggregationConfig {
            top_cities: 2,
            ..Default::default()
        };
        let (top, all) = city_counts(&leads, leads.len(), &config);
        assert_eq!(top.len(), 2);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_unmapped_country_dropped() {
        let leads = vec![
            lead("Pune", "IN", InquiryCategory::Others, None),
            lead("Pune", " in ", InquiryCategory::Others, None),
            lead("Rome", "IT", InquiryCategory::Others, None),
            lead("Nowhere", "XX", InquiryCategory::Others, None),
        ];
        let countries = country_counts(&leads, leads.len(), &AggregationConfig::default());

        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].name, "India");
        assert_eq!(countries[0].count, 2);
        assert_eq!(countries[0].percentage, 50);
        assert_eq!(countries[0].flag, "🇮🇳");
        assert_eq!(countries[1].name, "Italy");
        assert_eq!(countries[1].percentage, 25);
    }

    #[test]
    fn test_category_counts_cover_every_lead() {
        let leads = vec![
            lead("Pune", "IN", InquiryCategory::PurchaseInquiry, None),
            lead("Pune", "IN", InquiryCategory::PurchaseInquiry, None),
            lead("Pune", "IN", InquiryCategory::FleetManagement, None),
            lead("Pune", "IN", InquiryCategory::Others, None),
        ];
        let counts = category_counts(&leads, leads.len(), &PipelineConfig::default());

        let cats: Vec<_> = counts.iter().map(|c| c.category).collect();
        assert_eq!(
            cats,
            vec![
                InquiryCategory::PurchaseInquiry,
                InquiryCategory::FleetManagement,
                InquiryCategory::Others
            ]
        );
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), leads.len());
        assert_eq!(counts[0].percentage, 50);
        assert_eq!(counts[1].percentage, 25);
    }

    #[test]
    fn test_category_counts_with_reduced_table() {
        let mut config = PipelineConfig::default();
        config.categories.truncate(1);
        let leads = vec![lead("Pune", "IN", InquiryCategory::JobInternship, None)];
        let counts = category_counts(&leads, leads.len(), &config);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].category, InquiryCategory::JobInternship);
    }

    #[test]
    fn test_trailing_months_cross_year() {
        let months = trailing_months(today());
        assert_eq!(months.len(), TREND_MONTHS);
        assert_eq!(months[0], NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(months[11], NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_monthly_series_window() {
        let leads = vec![
            lead("Pune", "IN", InquiryCategory::Others, Some("2025-03-01")),
            lead("Pune", "IN", InquiryCategory::Others, Some("2025-03-31")),
            lead("Pune", "IN", InquiryCategory::Others, Some("2024-04-02")),
            lead("Pune", "IN", InquiryCategory::Others, Some("2024-03-31")),
            lead("Pune", "IN", InquiryCategory::Others, None),
        ];
        let series = monthly_series(&leads, today());

        assert_eq!(series.len(), 12);
        assert_eq!(series[0].month_key, "2024-04");
        assert_eq!(series[0].label, "Apr 2024");
        assert_eq!(series[0].responses, 1);
        assert_eq!(series[11].month_key, "2025-03");
        assert_eq!(series[11].responses, 2);
        assert_eq!(series.iter().map(|m| m.responses).sum::<usize>(), 3);
    }

    #[test]
    fn test_monthly_series_empty() {
        let series = monthly_series(&[], today());
        assert_eq!(series.len(), 12);
        assert!(series.iter().all(|m| m.responses == 0));
    }

    #[test]
    fn test_trend_stats() {
        let mut series = monthly_series(&[], today());
        for (i, m) in series.iter_mut().enumerate() {
            m.responses = i;
        }
        let t = trend_stats(&series);
        assert_eq!(t.window_total, 66);
        assert_eq!(t.last_quarter, 9 + 10 + 11);
        assert_eq!(t.peak_month, 11);
        assert_eq!(t.monthly_average, 6); // 5.5
    }

    #[test]
    fn test_summarize_empty() {
        let s = summarize(&[], 0, today(), &PipelineConfig::default());
        assert_eq!(s.total_responses, 0);
        assert_eq!(s.total_raw, 0);
        assert!(s.top_cities.is_empty());
        assert!(s.countries.is_empty());
        assert!(s.query_types.is_empty());
        assert_eq!(s.monthly_trend.len(), 12);
        assert!(!s.insights.is_empty());
    }
}
