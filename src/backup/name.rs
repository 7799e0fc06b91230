//! Snapshot file naming: `db_YYYY_MM_DD_HH_mm`, minute granularity.

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::{DbError, Result};

const NAME_PATTERN: &str = r"^db_(\d{4})_(\d{2})_(\d{2})_(\d{2})_(\d{2})$";
const NAME_FORMAT: &str = "db_%Y_%m_%d_%H_%M";

/// Snapshot name for a point in time. Seconds are dropped, so two snapshots
/// taken in the same minute share a name.
#[must_use]
pub fn format_name(at: &NaiveDateTime) -> String {
    at.format(NAME_FORMAT).to_string()
}

/// Compiled matcher for snapshot names.
///
/// Validity is the pattern alone. The digits are not checked against the
/// calendar, so a stray `db_2024_13_01_00_00` is still listed and restorable.
/// Names are fixed width, so ordering them as strings orders them by time.
#[derive(Debug, Clone)]
pub struct NamePattern {
    re: Regex,
}

impl NamePattern {
    pub fn new() -> Result<Self> {
        let re = Regex::new(NAME_PATTERN)
            .map_err(|e| DbError::Other(format!("invalid snapshot pattern: {e}")))?;
        Ok(Self { re })
    }

    /// Whether `name` is exactly a snapshot name.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.re.is_match(name)
    }

    /// Listing timestamp `YYYY-MM-DD HH:mm:00` built from the name's digits.
    #[must_use]
    pub fn timestamp(&self, name: &str) -> Option<String> {
        let caps = self.re.captures(name)?;
        Some(format!(
            "{}-{}-{} {}:{}:00",
            &caps[1], &caps[2], &caps[3], &caps[4], &caps[5]
        ))
    }
}
