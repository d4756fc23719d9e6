use crate::analyzers::classify::InquiryCategory;
use crate::analyzers::types::AggregateSummary;
use crate::analyzers::utility::pct;

/// Template sentences over an already-computed summary.
pub fn key_insights(s: &AggregateSummary) -> Vec<String> {
    let purchase = s.category_count(InquiryCategory::PurchaseInquiry);
    let partnership = s.category_count(InquiryCategory::BusinessPartnership);
    let jobs = s.category_count(InquiryCategory::JobInternship);

    let mut out = vec![format!(
        "{} total customer responses analyzed ({} rows filtered out)",
        s.total_responses,
        s.total_raw.saturating_sub(s.total_responses)
    )];

    match s.top_cities.first() {
        Some(city) => out.push(format!(
            "{} leads with {} responses ({}%)",
            city.name, city.count, city.percentage
        )),
        None => out.push("No city information available yet".to_string()),
    }

    out.push(format!(
        "{purchase} purchase inquiries ({}% direct buying intent)",
        pct(purchase, s.total_responses)
    ));
    out.push(format!("{} countries represented", s.countries.len()));
    out.push(format!(
        "{} responses in last 3 months, peak month reached {}",
        s.trend.last_quarter, s.trend.peak_month
    ));

    let top3: Vec<_> = s.top_cities.iter().take(3).collect();
    if !top3.is_empty() {
        let names: Vec<&str> = top3.iter().map(|c| c.name.as_str()).collect();
        let share: u32 = top3.iter().map(|c| c.percentage).sum();
        out.push(format!(
            "Top cities ({}) account for {share}% of responses",
            names.join(", ")
        ));
    }

    out.push(format!(
        "{partnership} partnership inquiries and {jobs} job applications"
    ));

    let international: usize = s
        .countries
        .iter()
        .filter(|c| c.code != "IN")
        .map(|c| c.count)
        .sum();
    out.push(format!("{international} international inquiries"));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{CategoryCount, CityCount, CountryCount, TrendStats};

    fn summary() -> AggregateSummary {
        AggregateSummary {
            total_responses: 10,
            total_raw: 14,
            time_range: String::new(),
            top_cities: vec![
                CityCount {
                    name: "Bengaluru".into(),
                    count: 5,
                    percentage: 50,
                },
                CityCount {
                    name: "Pune".into(),
                    count: 2,
                    percentage: 20,
                },
            ],
            all_cities: vec![],
            countries: vec![
                CountryCount {
                    code: "IN".into(),
                    name: "India".into(),
                    count: 8,
                    percentage: 80,
                    flag: "🇮🇳".into(),
                },
                CountryCount {
                    code: "US".into(),
                    name: "USA".into(),
                    count: 1,
                    percentage: 10,
                    flag: "🇺🇸".into(),
                },
            ],
            query_types: vec![
                CategoryCount {
                    category: InquiryCategory::PurchaseInquiry,
                    count: 6,
                    percentage: 60,
                },
                CategoryCount {
                    category: InquiryCategory::Others,
                    count: 4,
                    percentage: 40,
                },
            ],
            monthly_trend: vec![],
            trend: TrendStats {
                window_total: 9,
                last_quarter: 4,
                peak_month: 3,
                monthly_average: 1,
            },
            insights: vec![],
        }
    }

    #[test]
    fn test_insights_reflect_numbers() {
        let insights = key_insights(&summary());
        assert_eq!(
            insights[0],
            "10 total customer responses analyzed (4 rows filtered out)"
        );
        assert_eq!(insights[1], "Bengaluru leads with 5 responses (50%)");
        assert_eq!(insights[2], "6 purchase inquiries (60% direct buying intent)");
        assert_eq!(insights[3], "2 countries represented");
        assert_eq!(insights[4], "4 responses in last 3 months, peak month reached 3");
        assert_eq!(
            insights[5],
            "Top cities (Bengaluru, Pune) account for 70% of responses"
        );
        assert_eq!(insights[6], "0 partnership inquiries and 0 job applications");
        assert_eq!(insights[7], "1 international inquiries");
    }

    #[test]
    fn test_insights_without_cities() {
        let mut s = summary();
        s.top_cities.clear();
        let insights = key_insights(&s);
        assert_eq!(insights[1], "No city information available yet");
        assert!(!insights.iter().any(|i| i.starts_with("Top cities")));
    }
}
