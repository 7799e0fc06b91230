pub mod backup;
pub mod record;

pub use backup::BackupInfo;
pub use record::{Record, RecordEntry, FIELD_NAMES};
