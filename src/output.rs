//! Output formatting and persistence for pipeline snapshots.
//!
//! Supports log summaries, JSON export (optionally gzip-compressed), and a
//! CSV run log with one row per refresh.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::LeadPage;
use crate::snapshot::{Snapshot, SnapshotStatus};

/// One row of the run log.
#[derive(Debug, Default, Serialize)]
pub struct RunRecord {
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub total_raw: usize,
    pub total_valid: usize,
    pub dropped_name: usize,
    pub dropped_email: usize,
    pub dropped_query: usize,
    pub cities: usize,
    pub countries: usize,
    pub error_message: Option<String>,
}

impl RunRecord {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let (status, error_message) = match &snapshot.status {
            SnapshotStatus::Live => ("live", None),
            SnapshotStatus::Demo { reason } => ("demo", Some(reason.clone())),
        };
        let timestamp = snapshot.generated_at;
        let status = status.to_string();

        // demo figures are placeholders, not measurements of this run
        if snapshot.is_demo() {
            return RunRecord {
                timestamp,
                status,
                error_message,
                ..Default::default()
            };
        }

        let s = &snapshot.summary;
        RunRecord {
            timestamp,
            status,
            total_raw: s.total_raw,
            total_valid: s.total_responses,
            dropped_name: snapshot.dropped.name,
            dropped_email: snapshot.dropped.email,
            dropped_query: snapshot.dropped.query,
            cities: s.all_cities.len(),
            countries: s.countries.len(),
            error_message,
        }
    }
}

/// Logs the headline figures of a snapshot.
pub fn log_summary(snapshot: &Snapshot) {
    let s = &snapshot.summary;
    info!(
        demo = snapshot.is_demo(),
        valid = s.total_responses,
        raw = s.total_raw,
        "{}",
        s.time_range
    );
    for city in &s.top_cities {
        info!(city = %city.name, count = city.count, pct = city.percentage, "Top city");
    }
    for country in &s.countries {
        info!(
            country = %country.name,
            flag = %country.flag,
            count = country.count,
            pct = country.percentage,
            "Country"
        );
    }
    for qt in &s.query_types {
        info!(category = %qt.category, count = qt.count, pct = qt.percentage, "Inquiry type");
    }
    for m in &s.monthly_trend {
        debug!(month = %m.label, responses = m.responses, "Monthly responses");
    }
    for insight in &s.insights {
        info!("{insight}");
    }
}

/// Logs one page of the lead table.
pub fn log_lead_page(page: &LeadPage) {
    info!(
        page = page.page,
        total_pages = page.total_pages,
        total = page.total,
        "Leads"
    );
    for row in &page.rows {
        info!(
            date = %row.date,
            name = %row.name,
            email = %row.email,
            city = %row.city,
            category = %row.category,
            "{}",
            row.query
        );
    }
}

/// Logs a snapshot as pretty-printed JSON.
pub fn log_json(snapshot: &Snapshot) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}

/// Writes a snapshot as JSON, gzip-compressed when `gzip` is set.
pub fn write_snapshot(path: &str, snapshot: &Snapshot, gzip: bool) -> Result<()> {
    let body = serde_json::to_vec_pretty(snapshot)?;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(path)?;
    if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&body)?;
        file.write_all(&encoder.finish()?)?;
    } else {
        file.write_all(&body)?;
    }

    debug!(path, gzip, bytes = body.len(), "Snapshot written");
    Ok(())
}

/// Appends a [`RunRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &RunRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
