//! CSV record store with backup rotation

use crate::record::{Record, TagSet, Website};
use crate::storage::traits::{RecordStore, StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const HEADERS: [&str; 6] = [
    "name",
    "locality",
    "website",
    "type_tags",
    "keyword_tags",
    "summary",
];

/// One row of the record file
#[derive(Debug, Serialize, Deserialize)]
struct RecordRow {
    name: String,
    locality: String,
    website: String,
    type_tags: String,
    keyword_tags: String,
    summary: String,
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            locality: record.locality.clone(),
            website: record.website.to_string(),
            type_tags: record.type_tags.joined(),
            keyword_tags: record.keyword_tags.joined(),
            summary: record.summary.clone(),
        }
    }
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        // FromStr for these types is infallible
        let website: Website = row.website.parse().unwrap_or_default();
        let type_tags: TagSet = row.type_tags.parse().unwrap_or_default();
        let keyword_tags: TagSet = row.keyword_tags.parse().unwrap_or_default();
        Self {
            name: row.name,
            locality: row.locality,
            website,
            type_tags,
            keyword_tags,
            summary: row.summary,
        }
    }
}

/// Record store backed by a CSV file and a `.bak` sibling
///
/// After every successful save the backup holds the same content as the
/// primary file, so a primary corrupted later on is recovered with the most
/// recently saved record set.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    primary: PathBuf,
    backup: PathBuf,
}

impl CsvRecordStore {
    pub fn new(path: &Path) -> Self {
        let mut backup = path.as_os_str().to_owned();
        backup.push(".bak");
        Self {
            primary: path.to_path_buf(),
            backup: PathBuf::from(backup),
        }
    }

    pub fn path(&self) -> &Path {
        &self.primary
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    fn read_file(path: &Path) -> StoreResult<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        // Every save writes the header row, so a missing one means a torn write
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(StoreError::Corrupt(format!(
                "{}: missing header row",
                path.display()
            )));
        }
        if headers.iter().collect::<Vec<_>>() != HEADERS {
            return Err(StoreError::Corrupt(format!(
                "{}: unexpected header row",
                path.display()
            )));
        }

        let mut records = Vec::new();
        for row in reader.deserialize::<RecordRow>() {
            records.push(row?.into());
        }
        Ok(records)
    }

    fn write_file(path: &Path, records: &[Record]) -> StoreResult<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(HEADERS)?;
        for record in records {
            writer.serialize(RecordRow::from(record))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Puts the backup back in place of a damaged primary
    fn restore_primary(&self) -> bool {
        match std::fs::copy(&self.backup, &self.primary) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to restore {} from backup: {}",
                    self.primary.display(),
                    e
                );
                false
            }
        }
    }

    /// Saves through `write`, keeping the backup rotation around it
    fn save_with<W>(&self, records: &[Record], write: W) -> StoreResult<()>
    where
        W: FnOnce(&Path, &[Record]) -> StoreResult<()>,
    {
        if self.primary.exists() {
            // A damaged primary must never overwrite the last good backup
            match Self::read_file(&self.primary) {
                Ok(_) => {
                    if let Err(e) = std::fs::copy(&self.primary, &self.backup) {
                        tracing::warn!("Failed to back up {}: {}", self.primary.display(), e);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Keeping backup {}, primary is unreadable: {}",
                        self.backup.display(),
                        e
                    );
                }
            }
        }

        if let Err(e) = write(&self.primary, records) {
            let restored = self.backup.exists() && self.restore_primary();
            return Err(StoreError::WriteFailed {
                reason: e.to_string(),
                restored,
            });
        }

        if let Err(e) = std::fs::copy(&self.primary, &self.backup) {
            tracing::warn!("Failed to refresh backup {}: {}", self.backup.display(), e);
        }

        tracing::debug!(
            "Saved {} records to {}",
            records.len(),
            self.primary.display()
        );
        Ok(())
    }
}

impl RecordStore for CsvRecordStore {
    fn load(&self) -> StoreResult<Vec<Record>> {
        let primary_error = if self.primary.exists() {
            match Self::read_file(&self.primary) {
                Ok(records) => {
                    tracing::debug!(
                        "Loaded {} records from {}",
                        records.len(),
                        self.primary.display()
                    );
                    return Ok(records);
                }
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", self.primary.display(), e);
                    Some(e)
                }
            }
        } else {
            None
        };

        if !self.backup.exists() {
            return match primary_error {
                Some(e) => Err(e),
                None => Ok(Vec::new()),
            };
        }

        let records = Self::read_file(&self.backup)?;
        tracing::warn!(
            "Recovered {} records from backup {}",
            records.len(),
            self.backup.display()
        );
        self.restore_primary();
        Ok(records)
    }

    fn save(&self, records: &[Record]) -> StoreResult<()> {
        self.save_with(records, Self::write_file)
    }
}
