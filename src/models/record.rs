use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DbError, Result};

/// Field delimiter of the on-disk line format.
pub const DELIMITER: char = ':';

/// JSON field names in on-disk column order.
pub const FIELD_NAMES: [&str; 12] = [
    "name",
    "ip",
    "username",
    "password",
    "enablePassword",
    "osType",
    "access",
    "clear",
    "pollInterval",
    "locationId",
    "info",
    "ticketId",
];

/// Columns stored exactly as received, never trimmed.
const UNTRIMMED: [&str; 2] = ["password", "enablePassword"];

/// One managed device entry. Every field is free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub name: String,
    pub ip: String,
    pub username: String,
    pub password: String,
    pub enable_password: String,
    pub os_type: String,
    pub access: String,
    pub clear: String,
    pub poll_interval: String,
    pub location_id: String,
    pub info: String,
    pub ticket_id: String,
}

/// A record together with the line address it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEntry {
    /// 0-based absolute line number, header lines included.
    pub line_number: usize,
    #[serde(flatten)]
    pub record: Record,
}

impl Record {
    fn from_columns(cols: [String; 12]) -> Self {
        let [
            name,
            ip,
            username,
            password,
            enable_password,
            os_type,
            access,
            clear,
            poll_interval,
            location_id,
            info,
            ticket_id,
        ] = cols;
        Self {
            name,
            ip,
            username,
            password,
            enable_password,
            os_type,
            access,
            clear,
            poll_interval,
            location_id,
            info,
            ticket_id,
        }
    }

    /// Fields in on-disk column order.
    #[must_use]
    pub fn columns(&self) -> [&str; 12] {
        [
            self.name.as_str(),
            self.ip.as_str(),
            self.username.as_str(),
            self.password.as_str(),
            self.enable_password.as_str(),
            self.os_type.as_str(),
            self.access.as_str(),
            self.clear.as_str(),
            self.poll_interval.as_str(),
            self.location_id.as_str(),
            self.info.as_str(),
            self.ticket_id.as_str(),
        ]
    }

    /// Serialize as one colon-delimited line, without the trailing newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        self.columns().join(":")
    }

    /// Parse a data line. Lines with fewer than 12 fields are not records.
    ///
    /// Surrounding whitespace of the whole line is ignored, and so are extra
    /// fields past the twelfth.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut parts = line.split(DELIMITER);
        let mut cols: [String; 12] = Default::default();
        for col in &mut cols {
            *col = parts.next()?.to_string();
        }
        Some(Self::from_columns(cols))
    }

    /// Build a record from a JSON object carrying all twelve fields.
    ///
    /// Every missing key is reported at once. Numbers and booleans are
    /// accepted in their text form; other non-string values are rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| DbError::InvalidField {
            field: "body",
            detail: "expected a JSON object".into(),
        })?;

        let missing: Vec<&'static str> = FIELD_NAMES
            .iter()
            .copied()
            .filter(|f| !obj.contains_key(*f))
            .collect();
        if !missing.is_empty() {
            return Err(DbError::MissingFields { fields: missing });
        }

        let mut cols: [String; 12] = Default::default();
        for (col, field) in cols.iter_mut().zip(FIELD_NAMES) {
            let text = match &obj[field] {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(DbError::InvalidField {
                        field,
                        detail: "expected a string".into(),
                    })
                }
            };
            if let Some(bad) = text.chars().find(|&c| matches!(c, ':' | '\n' | '\r')) {
                return Err(DbError::InvalidField {
                    field,
                    detail: format!("must not contain {bad:?}"),
                });
            }
            *col = text;
        }

        Ok(Self::from_columns(cols))
    }

    /// Trim surrounding whitespace from every field except the two passwords.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        let mut cols: [String; 12] = Default::default();
        for ((col, value), field) in cols.iter_mut().zip(self.columns()).zip(FIELD_NAMES) {
            *col = if UNTRIMMED.contains(&field) {
                value.to_string()
            } else {
                value.trim().to_string()
            };
        }
        Self::from_columns(cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> Value {
        json!({
            "name": "core-sw1",
            "ip": "10.0.0.1",
            "username": "admin",
            "password": " s3cret ",
            "enablePassword": "en",
            "osType": "ios",
            "access": "ssh",
            "clear": "no",
            "pollInterval": 300,
            "locationId": "FRA1",
            "info": "rack 4",
            "ticketId": "T-1"
        })
    }

    #[test]
    fn from_json_reads_all_fields() {
        let rec = Record::from_json(&sample_json()).unwrap();
        assert_eq!(rec.name, "core-sw1");
        assert_eq!(rec.password, " s3cret ");
        assert_eq!(rec.poll_interval, "300");
        assert_eq!(rec.ticket_id, "T-1");
    }

    #[test]
    fn from_json_names_missing_fields() {
        let mut value = sample_json();
        let obj = value.as_object_mut().unwrap();
        obj.remove("ip");
        obj.remove("info");
        let err = Record::from_json(&value).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: ip, info");
    }

    #[test]
    fn from_json_rejects_delimiter_in_field() {
        let mut value = sample_json();
        value["info"] = json!("a:b");
        let err = Record::from_json(&value).unwrap_err();
        assert!(err.to_string().contains("info"));
    }

    #[test]
    fn from_json_rejects_null() {
        let mut value = sample_json();
        value["clear"] = Value::Null;
        assert!(matches!(
            Record::from_json(&value),
            Err(DbError::InvalidField { field: "clear", .. })
        ));
    }

    #[test]
    fn from_json_rejects_non_object() {
        assert!(Record::from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn line_round_trip() {
        let rec = Record::from_json(&sample_json()).unwrap();
        let line = rec.to_line();
        assert_eq!(line.matches(':').count(), 11);
        assert_eq!(Record::parse_line(&line), Some(rec));
    }

    #[test]
    fn parse_line_rejects_short_lines() {
        assert_eq!(Record::parse_line("a:b:c"), None);
        assert_eq!(Record::parse_line(""), None);
    }

    #[test]
    fn parse_line_ignores_extra_fields_and_cr() {
        let rec = Record::parse_line("a:b:c:d:e:f:g:h:i:j:k:l:m\r").unwrap();
        assert_eq!(rec.name, "a");
        assert_eq!(rec.ticket_id, "l");

        let rec = Record::parse_line("a:b:c:d:e:f:g:h:i:j:k:l\r").unwrap();
        assert_eq!(rec.ticket_id, "l");
    }

    #[test]
    fn parse_line_trims_the_whole_line() {
        let rec = Record::parse_line("  sw1:b:c: pw:e:f:g:h:i:j:k:T-1 \t").unwrap();
        assert_eq!(rec.name, "sw1");
        assert_eq!(rec.password, " pw");
        assert_eq!(rec.ticket_id, "T-1");
    }

    #[test]
    fn trimmed_keeps_passwords() {
        let rec = Record {
            name: "  sw  ".into(),
            password: " pw ".into(),
            enable_password: "\ten ".into(),
            ticket_id: " T ".into(),
            ..Record::default()
        };
        let t = rec.trimmed();
        assert_eq!(t.name, "sw");
        assert_eq!(t.ticket_id, "T");
        assert_eq!(t.password, " pw ");
        assert_eq!(t.enable_password, "\ten ");
    }

    #[test]
    fn entry_serializes_camel_case_flat() {
        let entry = RecordEntry {
            line_number: 3,
            record: Record::from_json(&sample_json()).unwrap(),
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["lineNumber"], 3);
        assert_eq!(v["enablePassword"], "en");
        assert_eq!(v["osType"], "ios");
    }
}
