//! Line-addressed record store over a single colon-delimited text file.
//!
//! Every call re-reads the file; nothing is cached between calls. Records are
//! addressed by their 0-based absolute line number at read time, so callers
//! must re-list after any mutation.
//!
//! Lines are handled as raw bytes. Text that is not valid UTF-8 is decoded
//! lossily for listing, and untouched lines are rewritten exactly as read.

pub mod layout;
pub mod writer;

use std::path::{Path, PathBuf};

use crate::error::{DbError, Result};
use crate::models::{Record, RecordEntry};

use layout::LineKind;

/// The primary record file.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All valid records in file order. Header and malformed lines are skipped.
    /// A missing file reads as empty.
    pub fn list(&self) -> Result<Vec<RecordEntry>> {
        let Some(content) = writer::read_optional(&self.path)? else {
            return Ok(Vec::new());
        };

        let entries: Vec<RecordEntry> = layout::split_lines(&content)
            .into_iter()
            .enumerate()
            .filter_map(|(line_number, line)| match layout::classify(line) {
                LineKind::Record(record) => Some(RecordEntry {
                    line_number,
                    record,
                }),
                LineKind::Header | LineKind::Malformed => None,
            })
            .collect();

        tracing::debug!(count = entries.len(), "listed records");
        Ok(entries)
    }

    /// Write a new record and return the line address it landed on.
    ///
    /// Without `insert_after` the line is appended to the end of the file and
    /// prior bytes are left alone. With it, the record is spliced in right
    /// after that line (never inside the header block) and the file is rewritten.
    pub fn append(&self, record: &Record, insert_after: Option<usize>) -> Result<usize> {
        let content = writer::read_optional(&self.path)?.unwrap_or_default();
        let new_line = record.to_line();

        let Some(after) = insert_after else {
            let line_number = layout::split_lines(&content).len();
            let mut bytes = Vec::with_capacity(new_line.len() + 2);
            if !content.is_empty() && !content.ends_with(b"\n") {
                bytes.push(b'\n');
            }
            bytes.extend_from_slice(new_line.as_bytes());
            bytes.push(b'\n');
            writer::append(&self.path, &bytes)?;
            tracing::debug!(line_number, "appended record");
            return Ok(line_number);
        };

        let mut lines = layout::split_lines(&content);
        let index = layout::insertion_index(&lines, after);
        lines.insert(index, new_line.as_bytes());
        writer::write_atomic(&self.path, &layout::join_lines(&lines))?;
        tracing::debug!(after, line_number = index, "inserted record");
        Ok(index)
    }

    /// Replace the record at `line` in place. All other lines are kept byte for byte.
    ///
    /// Fields are trimmed except the two passwords.
    pub fn update(&self, line: usize, record: &Record) -> Result<()> {
        let new_line = record.trimmed().to_line();
        let content = writer::read_optional(&self.path)?.unwrap_or_default();
        let mut lines = layout::split_lines(&content);

        let current = lines.get(line).ok_or(DbError::LineNotFound { line })?;
        if layout::is_header_line(current) {
            return Err(DbError::HeaderEdit { line });
        }

        lines[line] = new_line.as_bytes();
        writer::write_atomic(&self.path, &layout::join_lines(&lines))?;
        tracing::debug!(line, "updated record");
        Ok(())
    }

    /// Remove the line at `line`. Every later address shifts down by one.
    pub fn delete(&self, line: usize) -> Result<()> {
        let content = writer::read_optional(&self.path)?.ok_or(DbError::LineNotFound { line })?;
        let mut lines = layout::split_lines(&content);

        let current = lines.get(line).ok_or(DbError::LineNotFound { line })?;
        if layout::is_header_line(current) {
            return Err(DbError::HeaderDelete { line });
        }

        lines.remove(line);
        writer::write_atomic(&self.path, &layout::join_lines(&lines))?;
        tracing::debug!(line, remaining = lines.len(), "deleted line");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rec(name: &str) -> Record {
        Record {
            name: name.into(),
            ip: format!("10.0.0.{}", name.len()),
            username: "admin".into(),
            password: "pw".into(),
            enable_password: "en".into(),
            os_type: "ios".into(),
            access: "ssh".into(),
            clear: "no".into(),
            poll_interval: "300".into(),
            location_id: "FRA1".into(),
            info: "-".into(),
            ticket_id: "T-1".into(),
        }
    }

    fn store_with(content: &str) -> (TempDir, RecordStore) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db.txt");
        std::fs::write(&path, content).unwrap();
        (tmp, RecordStore::new(path))
    }

    fn read(store: &RecordStore) -> String {
        std::fs::read_to_string(store.path()).unwrap()
    }

    fn names(store: &RecordStore) -> Vec<(usize, String)> {
        store
            .list()
            .unwrap()
            .into_iter()
            .map(|e| (e.line_number, e.record.name))
            .collect()
    }

    #[test]
    fn list_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path().join("absent.txt"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_skips_headers_and_malformed_lines() {
        let content = format!(
            "HDR:v1\n# devices\n{}\nlegacy:line\n\n{}\n",
            rec("A").to_line(),
            rec("B").to_line()
        );
        let (_tmp, store) = store_with(&content);
        assert_eq!(names(&store), vec![(2, "A".into()), (5, "B".into())]);
    }

    #[test]
    fn append_then_list_round_trip() {
        let (_tmp, store) = store_with("HDR:v1\n");
        let line = store.append(&rec("core"), None).unwrap();
        assert_eq!(line, 1);

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record, rec("core"));

        store.delete(entries[0].line_number).unwrap();
        assert!(store.list().unwrap().is_empty());
        assert_eq!(read(&store), "HDR:v1\n");
    }

    #[test]
    fn append_creates_missing_file() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path().join("db.txt"));
        assert_eq!(store.append(&rec("A"), None).unwrap(), 0);
        assert_eq!(read(&store), format!("{}\n", rec("A").to_line()));
    }

    #[test]
    fn append_does_not_merge_into_unterminated_line() {
        let (_tmp, store) = store_with("HDR:v1");
        store.append(&rec("A"), None).unwrap();
        assert_eq!(read(&store), format!("HDR:v1\n{}\n", rec("A").to_line()));
    }

    #[test]
    fn append_preserves_prior_bytes() {
        let original = "HDR:v1\r\nlegacy\r\n";
        let (_tmp, store) = store_with(original);
        store.append(&rec("A"), None).unwrap();
        assert!(read(&store).starts_with(original));
    }

    #[test]
    fn insert_after_places_record_behind_target() {
        let content = format!(
            "HDR:v1\n# c\n{}\n{}\n{}\n",
            rec("A").to_line(),
            rec("B").to_line(),
            rec("C").to_line()
        );
        let (_tmp, store) = store_with(&content);

        let line = store.append(&rec("X"), Some(3)).unwrap();
        assert_eq!(line, 4);
        assert_eq!(
            names(&store),
            vec![
                (2, "A".into()),
                (3, "B".into()),
                (4, "X".into()),
                (5, "C".into())
            ]
        );
        assert!(read(&store).starts_with("HDR:v1\n# c\n"));
    }

    #[test]
    fn insert_after_header_address_goes_first() {
        let content = format!("HDR:v1\n{}\n", rec("A").to_line());
        let (_tmp, store) = store_with(&content);
        store.append(&rec("X"), Some(0)).unwrap();
        assert_eq!(names(&store), vec![(1, "X".into()), (2, "A".into())]);
    }

    #[test]
    fn insert_keeps_malformed_lines() {
        let content = format!("{}\nbroken\n", rec("A").to_line());
        let (_tmp, store) = store_with(&content);
        store.append(&rec("X"), Some(0)).unwrap();
        let text = read(&store);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "broken");
    }

    #[test]
    fn update_replaces_only_target_line() {
        let content = format!(
            "HDR:v1\n{}\nlegacy\n{}\n",
            rec("A").to_line(),
            rec("B").to_line()
        );
        let (_tmp, store) = store_with(&content);

        let mut changed = rec("  B2  ");
        changed.password = " keep ".into();
        store.update(3, &changed).unwrap();

        let text = read(&store);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "HDR:v1");
        assert_eq!(lines[1], rec("A").to_line());
        assert_eq!(lines[2], "legacy");
        let updated = Record::parse_line(lines[3]).unwrap();
        assert_eq!(updated.name, "B2");
        assert_eq!(updated.password, " keep ");
    }

    #[test]
    fn update_out_of_range_is_not_found() {
        let (_tmp, store) = store_with("HDR:v1\n");
        assert!(matches!(
            store.update(5, &rec("A")),
            Err(DbError::LineNotFound { line: 5 })
        ));
    }

    #[test]
    fn header_lines_are_immune() {
        let content = format!("HDR:v1\n# note\n\n{}\n", rec("A").to_line());
        let (_tmp, store) = store_with(&content);

        for line in 0..3 {
            assert!(matches!(
                store.update(line, &rec("X")),
                Err(DbError::HeaderEdit { .. })
            ));
            assert!(matches!(
                store.delete(line),
                Err(DbError::HeaderDelete { .. })
            ));
        }
        assert_eq!(read(&store), content);
    }

    #[test]
    fn delete_shifts_later_addresses() {
        let content = format!(
            "HDR:v1\n{}\n{}\n{}\n",
            rec("A").to_line(),
            rec("B").to_line(),
            rec("C").to_line()
        );
        let (_tmp, store) = store_with(&content);

        store.delete(2).unwrap();
        assert_eq!(names(&store), vec![(1, "A".into()), (2, "C".into())]);
    }

    #[test]
    fn delete_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path().join("absent.txt"));
        assert!(matches!(
            store.delete(0),
            Err(DbError::LineNotFound { line: 0 })
        ));
    }

    #[test]
    fn delete_can_remove_malformed_line() {
        let content = format!("{}\nbroken\n", rec("A").to_line());
        let (_tmp, store) = store_with(&content);
        store.delete(1).unwrap();
        assert_eq!(read(&store), format!("{}\n", rec("A").to_line()));
    }

    #[test]
    fn non_utf8_line_does_not_break_the_store() {
        let latin1: &[u8] = b"muc-sw1:10.4.0.1:admin:pw:en:ios:ssh:no:60:M\xfcnchen:lab:T-7";
        let mut content = b"HDR:v1\n".to_vec();
        content.extend_from_slice(latin1);
        content.push(b'\n');
        content.extend_from_slice(rec("A").to_line().as_bytes());
        content.push(b'\n');
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db.txt");
        std::fs::write(&path, &content).unwrap();
        let store = RecordStore::new(&path);

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].line_number, 1);
        assert_eq!(entries[0].record.location_id, "M\u{FFFD}nchen");

        store.update(2, &rec("B")).unwrap();
        store.append(&rec("C"), Some(2)).unwrap();
        store.delete(3).unwrap();

        let mut expected = b"HDR:v1\n".to_vec();
        expected.extend_from_slice(latin1);
        expected.push(b'\n');
        expected.extend_from_slice(rec("B").to_line().as_bytes());
        expected.push(b'\n');
        assert_eq!(std::fs::read(&path).unwrap(), expected);
    }

    #[test]
    fn header_a_b_scenario() {
        let content = format!("HDR:v1\n{}\n{}\n", rec("A").to_line(), rec("B").to_line());
        let (_tmp, store) = store_with(&content);

        store.delete(1).unwrap();
        assert_eq!(names(&store), vec![(1, "B".into())]);

        assert_eq!(store.append(&rec("C"), None).unwrap(), 2);
        assert_eq!(names(&store), vec![(1, "B".into()), (2, "C".into())]);

        store.update(2, &rec("C2")).unwrap();
        assert_eq!(names(&store), vec![(1, "B".into()), (2, "C2".into())]);
        let entries = store.list().unwrap();
        assert_eq!(entries[0].record, rec("B"));
    }
}
