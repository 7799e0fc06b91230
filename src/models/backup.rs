use serde::Serialize;

/// One snapshot in the history directory, as returned by a backup listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupInfo {
    /// Bare file name, e.g. `db_2024_01_31_23_59`.
    pub filename: String,
    /// Snapshot time rendered as `YYYY-MM-DD HH:MM:00`.
    pub timestamp: String,
    /// File size in KiB, rounded to two decimals.
    #[serde(rename = "sizeKB")]
    pub size_kb: f64,
}

impl BackupInfo {
    #[must_use]
    pub fn new(filename: String, timestamp: String, size_bytes: u64) -> Self {
        Self {
            filename,
            timestamp,
            size_kb: (size_bytes as f64 / 1024.0 * 100.0).round() / 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_rounded_kib() {
        let b = BackupInfo::new("db_2024_01_01_00_00".into(), "2024-01-01 00:00:00".into(), 1536);
        assert!((b.size_kb - 1.5).abs() < f64::EPSILON);

        let b = BackupInfo::new("db_2024_01_01_00_00".into(), "2024-01-01 00:00:00".into(), 100);
        assert!((b.size_kb - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_size_as_size_kb() {
        let b = BackupInfo::new("db_2024_01_01_00_00".into(), "2024-01-01 00:00:00".into(), 0);
        let v = serde_json::to_value(&b).unwrap();
        assert_eq!(v["filename"], "db_2024_01_01_00_00");
        assert_eq!(v["sizeKB"], 0.0);
    }
}
