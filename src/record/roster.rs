//! External roster import
//!
//! Merges organization names from a roster CSV into the record set. Existing
//! records are never touched; only unseen names are appended.

use crate::config::RosterSettings;
use crate::record::Record;
use crate::{Result, ScoutError};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;
use std::path::Path;

/// Merges a roster file into `records`, returning the number of new records
pub fn merge_roster(
    records: &mut Vec<Record>,
    path: &Path,
    settings: &RosterSettings,
) -> Result<usize> {
    let content = std::fs::read_to_string(path)?;
    merge_roster_content(records, &content, settings)
}

/// Merges roster CSV text into `records`
pub fn merge_roster_content(
    records: &mut Vec<Record>,
    content: &str,
    settings: &RosterSettings,
) -> Result<usize> {
    let mut reader = ReaderBuilder::new()
        .has_headers(settings.has_headers)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut known: HashSet<String> = records.iter().map(|r| r.name.clone()).collect();
    let mut added = 0;

    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| {
            ScoutError::Roster(format!("Failed to parse roster row {}: {}", index + 1, e))
        })?;

        let Some(name) = accepted_name(&row, settings) else {
            continue;
        };

        if !known.insert(name.clone()) {
            continue;
        }

        let locality = row.get(settings.locality_column).unwrap_or("").trim();
        records.push(Record::new(name, locality));
        added += 1;
    }

    tracing::info!("Roster import added {} new records", added);
    Ok(added)
}

/// Returns the row's name if it passes the roster filters
fn accepted_name(row: &StringRecord, settings: &RosterSettings) -> Option<String> {
    let name = row.get(settings.name_column)?.trim();

    // Spreadsheet exports leak formulas into the name column
    if name.chars().count() <= settings.min_name_length || name.contains('=') {
        return None;
    }

    if let Some(fragment) = &settings.required_substring {
        if !name.to_lowercase().contains(&fragment.to_lowercase()) {
            return None;
        }
    }

    Some(name.to_string())
}
