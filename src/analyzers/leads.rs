//! Lead listing for the dashboard table.

use chrono::{DateTime, Utc};

use crate::analyzers::types::{LeadPage, LeadRow, ValidatedLead};
use crate::dates::display_date;

fn or_na(value: &str) -> String {
    if value.is_empty() {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}

impl From<&ValidatedLead> for LeadRow {
    fn from(lead: &ValidatedLead) -> Self {
        let r = &lead.record;
        LeadRow {
            name: or_na(&r.name),
            email: or_na(&r.email),
            phone_number: or_na(&r.phone_number),
            query: or_na(&lead.query_preview),
            city: or_na(&r.city),
            category: lead.category.to_string(),
            date: display_date(lead.timestamp),
        }
    }
}

impl LeadRow {
    /// Stand-in row for an empty table.
    pub fn placeholder(name: &str, query: &str) -> Self {
        LeadRow {
            name: name.to_string(),
            email: "N/A".to_string(),
            phone_number: "N/A".to_string(),
            query: query.to_string(),
            city: "N/A".to_string(),
            category: "N/A".to_string(),
            date: "N/A".to_string(),
        }
    }
}

/// Newest first; undated leads sort as if dated at the Unix epoch.
pub fn sort_latest_first(leads: &mut [ValidatedLead]) {
    let epoch = DateTime::<Utc>::UNIX_EPOCH.naive_utc();
    leads.sort_by(|a, b| {
        b.timestamp
            .unwrap_or(epoch)
            .cmp(&a.timestamp.unwrap_or(epoch))
    });
}

/// Display rows for the `limit` newest leads, or one placeholder row.
pub fn recent_leads(sorted: &[ValidatedLead], limit: usize) -> Vec<LeadRow> {
    if sorted.is_empty() {
        return vec![LeadRow::placeholder(
            "No data found",
            "Add more data to see customer leads",
        )];
    }
    sorted.iter().take(limit).map(LeadRow::from).collect()
}

/// 1-based page of display rows. Out-of-range pages clamp to the last page.
pub fn paginate(sorted: &[ValidatedLead], page: usize, per_page: usize) -> LeadPage {
    let per_page = per_page.max(1);
    let total = sorted.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let rows = sorted
        .iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .map(LeadRow::from)
        .collect();

    LeadPage {
        rows,
        page,
        total_pages,
        total,
    }
}
