//! Journal-to-CSV rollup for archiving workout records.
//!
//! The CSV archive is fsynced before the journal is renamed, so a crash
//! between the two steps leaves records in both places rather than in
//! neither. [`crate::store::JournalStore`] deduplicates them by id on read.
//! The journal's exclusive lock is held from the first read until the
//! rename, so no batch can slip in between.

use crate::lock::LockFile;
use crate::{Result, WorkoutRecord};
use std::fs::OpenOptions;
use std::path::Path;

/// Roll up journal records into the CSV archive and retire the journal
///
/// 1. Takes the journal's exclusive lock and reads all records
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the journal to `.processed`, then releases the lock
///
/// Returns the number of records archived.
pub fn archive_journal(journal_path: &Path, archive_path: &Path) -> Result<usize> {
    if !journal_path.exists() {
        return Ok(0);
    }

    let _lock = LockFile::exclusive(journal_path)?;
    let records = crate::store::read_journal_unlocked(journal_path)?;

    if records.is_empty() {
        tracing::info!("No records in journal to roll up");
        return Ok(0);
    }

    if let Some(parent) = archive_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(archive_path)?;

    // Headers only go at the top of a fresh archive
    let needs_headers = file.metadata()?.len() == 0;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in &records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} records to {:?}", records.len(), archive_path);

    let processed_path = journal_path.with_extension("jsonl.processed");
    std::fs::rename(journal_path, &processed_path)?;

    tracing::info!("Archived journal to {:?}", processed_path);

    Ok(records.len())
}

/// Read every record from the CSV archive
///
/// Rows that fail to deserialize are skipped with a warning.
pub fn read_archive(path: &Path) -> Result<Vec<WorkoutRecord>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<WorkoutRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Failed to read archive row {}: {}", row + 1, e),
        }
    }

    Ok(records)
}

/// Remove retired journals (`*.processed`) from a directory
pub fn cleanup_processed_journals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed journal: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journals", count);
    }

    Ok(count)
}
