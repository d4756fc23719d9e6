//! Spreadsheet row model.

use serde::{Deserialize, Serialize};

/// Column of the inquiry sheet, in the order the export lays them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    PhoneNumber,
    Query,
    VehicleType,
    Timestamp,
    Language,
    IpAddress,
    City,
    Country,
    Lat,
    Long,
}

impl Field {
    /// Every field in export column order.
    pub const ALL: [Field; 12] = [
        Field::Name,
        Field::Email,
        Field::PhoneNumber,
        Field::Query,
        Field::VehicleType,
        Field::Timestamp,
        Field::Language,
        Field::IpAddress,
        Field::City,
        Field::Country,
        Field::Lat,
        Field::Long,
    ];

    /// Header token used by the export for this column.
    pub fn header(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::PhoneNumber => "phone_number",
            Field::Query => "query",
            Field::VehicleType => "vehicle_type",
            Field::Timestamp => "timestamp",
            Field::Language => "language",
            Field::IpAddress => "ip_address",
            Field::City => "city",
            Field::Country => "country",
            Field::Lat => "lat",
            Field::Long => "long",
        }
    }
}

/// One unvalidated sheet row. Any field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub query: String,
    pub vehicle_type: String,
    pub timestamp: String,
    pub language: String,
    pub ip_address: String,
    pub city: String,
    pub country: String,
    pub lat: String,
    pub long: String,
}

impl RawRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::PhoneNumber => &self.phone_number,
            Field::Query => &self.query,
            Field::VehicleType => &self.vehicle_type,
            Field::Timestamp => &self.timestamp,
            Field::Language => &self.language,
            Field::IpAddress => &self.ip_address,
            Field::City => &self.city,
            Field::Country => &self.country,
            Field::Lat => &self.lat,
            Field::Long => &self.long,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::PhoneNumber => &mut self.phone_number,
            Field::Query => &mut self.query,
            Field::VehicleType => &mut self.vehicle_type,
            Field::Timestamp => &mut self.timestamp,
            Field::Language => &mut self.language,
            Field::IpAddress => &mut self.ip_address,
            Field::City => &mut self.city,
            Field::Country => &mut self.country,
            Field::Lat => &mut self.lat,
            Field::Long => &mut self.long,
        };
        *slot = value;
    }

    /// Copy of the record with every field trimmed.
    pub fn trimmed(&self) -> Self {
        let mut out = RawRecord::default();
        for field in Field::ALL {
            out.set(field, self.get(field).trim().to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set_cover_every_field() {
        let mut record = RawRecord::default();
        for (i, field) in Field::ALL.iter().enumerate() {
            record.set(*field, format!("v{i}"));
        }
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(record.get(*field), format!("v{i}"));
        }
    }

    #[test]
    fn test_headers_follow_export_order() {
        let headers: Vec<_> = Field::ALL.iter().map(|f| f.header()).collect();
        assert_eq!(
            headers,
            vec![
                "name",
                "email",
                "phone_number",
                "query",
                "vehicle_type",
                "timestamp",
                "language",
                "ip_address",
                "city",
                "country",
                "lat",
                "long"
            ]
        );
    }

    #[test]
    fn test_trimmed() {
        let record = RawRecord {
            name: "  Jane ".into(),
            city: "\tPune ".into(),
            ..Default::default()
        };
        let t = record.trimmed();
        assert_eq!(t.name, "Jane");
        assert_eq!(t.city, "Pune");
    }
}
