//! Permissive parser for the sheet's CSV export.
//!
//! The export is not strict RFC 4180: a double quote simply toggles quoted
//! mode and is dropped, so the `csv` crate's reader is not used here.

use tracing::{debug, warn};

use crate::config::HeaderMapping;
use crate::record::{Field, RawRecord};

const BOM: char = '\u{feff}';

/// Header cells plus every data row of one export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl ParsedSheet {
    /// Number of data rows, i.e. the raw response count.
    pub fn raw_count(&self) -> usize {
        self.records.len()
    }
}

/// Splits one line into trimmed fields.
///
/// Commas inside double quotes do not split; the quotes themselves are not
/// kept. An unterminated trailing field is still emitted.
pub fn split_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                values.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    values.push(current.trim().to_string());

    values
}

fn normalize_header(cell: &str) -> String {
    cell.trim_start_matches(BOM)
        .trim()
        .replace('"', "")
        .to_lowercase()
}

/// Column index for each entry of [`Field::ALL`].
fn column_map(headers: &[String], mapping: HeaderMapping) -> Vec<Option<usize>> {
    let positional = || (0..Field::ALL.len()).map(Some).collect();

    match mapping {
        HeaderMapping::Positional => positional(),
        HeaderMapping::ByName => {
            let by_name: Vec<Option<usize>> = Field::ALL
                .iter()
                .map(|f| headers.iter().position(|h| h == f.header()))
                .collect();

            if by_name.iter().all(Option::is_none) {
                warn!(
                    ?headers,
                    "No expected column names in header, falling back to positional mapping"
                );
                positional()
            } else {
                let missing: Vec<_> = Field::ALL
                    .iter()
                    .zip(&by_name)
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(f, _)| f.header())
                    .collect();
                if !missing.is_empty() {
                    debug!(?missing, "Header is missing columns, they will read as empty");
                }
                by_name
            }
        }
    }
}

/// Parses an export into a header row and [`RawRecord`]s.
///
/// Blank lines are discarded and the first remaining line is treated as the
/// header. Short rows read as empty strings; extra values are ignored. This
/// never fails: a blob without any non-blank line yields an empty sheet.
pub fn parse_sheet(text: &str, mapping: HeaderMapping) -> ParsedSheet {
    // files saved as "CSV UTF-8" lead with a byte-order mark
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut lines = text.split('\n').filter(|l| !l.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return ParsedSheet::default();
    };

    let headers: Vec<String> = split_line(header_line)
        .iter()
        .map(|h| normalize_header(h))
        .collect();
    let columns = column_map(&headers, mapping);

    let records = lines
        .map(|line| {
            let values = split_line(line);
            let mut record = RawRecord::default();
            for (field, column) in Field::ALL.iter().zip(&columns) {
                let value = column
                    .and_then(|idx| values.get(idx))
                    .cloned()
                    .unwrap_or_default();
                record.set(*field, value);
            }
            record
        })
        .collect();

    ParsedSheet { headers, records }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "name,email,phone_number,query,vehicle_type,timestamp,language,ip_address,city,country,lat,long";

    #[test]
    fn test_quoted_comma_stays_in_one_field() {
        let values = split_line(r#"Jane,"Acme, Inc",x"#);
        assert_eq!(values, vec!["Jane", "Acme, Inc", "x"]);
    }

    #[test]
    fn test_unterminated_quote_still_emits_field() {
        let values = split_line(r#"a,"b, c"#);
        assert_eq!(values, vec!["a", "b, c"]);
    }

    #[test]
    fn test_trailing_comma_yields_empty_field() {
        assert_eq!(split_line("a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_header_only_yields_no_records() {
        let sheet = parse_sheet(HEADER, HeaderMapping::ByName);
        assert_eq!(sheet.raw_count(), 0);
        assert_eq!(sheet.headers.len(), 12);
    }

    #[test]
    fn test_empty_input() {
        let sheet = parse_sheet("\n  \n", HeaderMapping::ByName);
        assert!(sheet.headers.is_empty());
        assert!(sheet.records.is_empty());
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let text = format!(
            "{HEADER}\r\n\r\nJane,jane@x.com,123,\"Price, please\",car,8/1/2024,en,1.2.3.4,Pune,IN,1,2\r\n\n"
        );
        let sheet = parse_sheet(&text, HeaderMapping::ByName);
        assert_eq!(sheet.raw_count(), 1);
        let r = &sheet.records[0];
        assert_eq!(r.name, "Jane");
        assert_eq!(r.query, "Price, please");
        assert_eq!(r.city, "Pune");
        assert_eq!(r.long, "2");
    }

    #[test]
    fn test_byte_order_mark_before_header() {
        let text = format!("\u{feff}{HEADER}\nJane Doe,jane@x.com,1,I want a dashcam");
        let sheet = parse_sheet(&text, HeaderMapping::ByName);
        assert_eq!(sheet.headers[0], "name");
        let r = &sheet.records[0];
        assert_eq!(r.name, "Jane Doe");
        assert_eq!(r.email, "jane@x.com");
        assert_eq!(r.query, "I want a dashcam");
    }

    #[test]
    fn test_short_row_fills_empty_strings() {
        let text = format!("{HEADER}\nJane,jane@x.com");
        let sheet = parse_sheet(&text, HeaderMapping::ByName);
        let r = &sheet.records[0];
        assert_eq!(r.email, "jane@x.com");
        assert_eq!(r.query, "");
        assert_eq!(r.long, "");
    }

    #[test]
    fn test_name_mapping_handles_reordered_columns() {
        let text = "\"City\",Email,NAME,query\nPune,a@b.com,Jane,hello there friend";
        let sheet = parse_sheet(text, HeaderMapping::ByName);
        let r = &sheet.records[0];
        assert_eq!(r.name, "Jane");
        assert_eq!(r.email, "a@b.com");
        assert_eq!(r.city, "Pune");
        assert_eq!(r.query, "hello there friend");
        assert_eq!(r.country, "");
    }

    #[test]
    fn test_positional_mapping_ignores_header_text() {
        let text = "city,email,name\nPune,a@b.com,Jane";
        let sheet = parse_sheet(text, HeaderMapping::Positional);
        let r = &sheet.records[0];
        assert_eq!(r.name, "Pune");
        assert_eq!(r.email, "a@b.com");
        assert_eq!(r.phone_number, "Jane");
    }

    #[test]
    fn test_unknown_header_falls_back_to_positional() {
        let text = "Full Name,Mail\nJane,a@b.com";
        let sheet = parse_sheet(text, HeaderMapping::ByName);
        let r = &sheet.records[0];
        assert_eq!(r.name, "Jane");
        assert_eq!(r.email, "a@b.com");
    }
}
