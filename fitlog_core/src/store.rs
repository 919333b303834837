//! Record store adapter.
//!
//! The aggregator and the logging workflow only talk to [`RecordStore`].
//! Two implementations ship with the crate: [`MemoryStore`] for in-process
//! use and [`JournalStore`], which appends JSON lines to a locked journal
//! file and also reads the CSV archive produced by [`crate::rollup`].

use crate::lock::LockFile;
use crate::window::TimeWindow;
use crate::{CategoryTotal, OwnerId, Result, WorkoutRecord};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Durable storage for workout records
pub trait RecordStore {
    /// Persist a batch of records as one unit.
    ///
    /// Either every record becomes visible to later queries or none does.
    fn append_batch(&mut self, records: &[WorkoutRecord]) -> Result<()>;

    /// Records of `owner` dated inside `window`, in the order they were stored
    fn query_range(&self, owner: &OwnerId, window: &TimeWindow) -> Result<Vec<WorkoutRecord>>;

    /// Calories of `owner` inside `window` summed per category
    fn category_totals(&self, owner: &OwnerId, window: &TimeWindow) -> Result<Vec<CategoryTotal>> {
        Ok(group_by_category(&self.query_range(owner, window)?))
    }
}

/// Sum calories per category, groups in first-seen order
pub fn group_by_category(records: &[WorkoutRecord]) -> Vec<CategoryTotal> {
    records.iter().fold(Vec::new(), |mut totals, record| {
        match totals.iter_mut().find(|t| t.category == record.category) {
            Some(total) => total.total_calories += record.calories_burned,
            None => totals.push(CategoryTotal {
                category: record.category.clone(),
                total_calories: record.calories_burned,
            }),
        }
        totals
    })
}

// ============================================================================
// In-memory store
// ============================================================================

/// Store keeping records in a vector
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: Vec<WorkoutRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[WorkoutRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn append_batch(&mut self, records: &[WorkoutRecord]) -> Result<()> {
        self.records.extend_from_slice(records);
        Ok(())
    }

    fn query_range(&self, owner: &OwnerId, window: &TimeWindow) -> Result<Vec<WorkoutRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| &r.owner_id == owner && window.contains(r.date))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Journal-backed store
// ============================================================================

/// JSONL journal with file locking, plus the CSV archive for reads
///
/// Writers, readers and [`crate::rollup::archive_journal`] coordinate on the
/// journal's sidecar lock, so a rollup never retires a journal while a batch
/// is being appended to it.
pub struct JournalStore {
    journal_path: PathBuf,
    archive_path: PathBuf,
}

impl JournalStore {
    pub fn new(journal_path: impl Into<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        Self {
            journal_path: journal_path.into(),
            archive_path: archive_path.into(),
        }
    }

    pub fn from_config(data: &crate::config::DataConfig) -> Self {
        Self::new(data.journal_path(), data.archive_path())
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Every stored record, archive first, without duplicates
    fn load_all(&self) -> Result<Vec<WorkoutRecord>> {
        let _lock = LockFile::shared(&self.journal_path)?;
        let mut seen_ids = HashSet::new();
        let mut records = Vec::new();

        if self.archive_path.exists() {
            for record in crate::rollup::read_archive(&self.archive_path)? {
                if seen_ids.insert(record.id) {
                    records.push(record);
                }
            }
        }

        let archived = records.len();
        for record in read_journal_unlocked(&self.journal_path)? {
            if seen_ids.insert(record.id) {
                records.push(record);
            }
        }

        tracing::debug!(
            "Loaded {} archived and {} journaled records",
            archived,
            records.len() - archived
        );
        Ok(records)
    }
}

impl RecordStore for JournalStore {
    fn append_batch(&mut self, records: &[WorkoutRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        // Serialize everything before touching the file
        let mut batch = String::new();
        for record in records {
            batch.push_str(&serde_json::to_string(record)?);
            batch.push('\n');
        }

        // Also creates the journal directory
        let _lock = LockFile::exclusive(&self.journal_path)?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.journal_path)?;

        let committed_len = file.metadata()?.len();
        if committed_len > 0 && !ends_with_newline(&mut file, committed_len)? {
            // A torn write left a partial line; start the batch on a fresh one
            tracing::warn!("Journal {:?} ends mid-line", self.journal_path);
            batch.insert(0, '\n');
        }

        let written = write_batch(&file, batch.as_bytes());
        if written.is_err() {
            // Drop whatever part of the batch reached the file
            if let Err(e) = file.set_len(committed_len) {
                tracing::error!(
                    "Failed to roll back partial batch in {:?}: {}",
                    self.journal_path,
                    e
                );
            }
        }
        written?;

        tracing::debug!("Appended {} records to journal", records.len());
        Ok(())
    }

    fn query_range(&self, owner: &OwnerId, window: &TimeWindow) -> Result<Vec<WorkoutRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| &r.owner_id == owner && window.contains(r.date))
            .collect())
    }
}

fn write_batch(mut file: &File, bytes: &[u8]) -> Result<()> {
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_data()?;
    Ok(())
}

fn ends_with_newline(file: &mut File, len: u64) -> Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Read all records from a journal file under its shared lock
///
/// Unparseable lines are skipped with a warning.
pub fn read_journal(path: &Path) -> Result<Vec<WorkoutRecord>> {
    let _lock = LockFile::shared(path)?;
    read_journal_unlocked(path)
}

/// Read a journal whose lock the caller already holds
pub(crate) fn read_journal_unlocked(path: &Path) -> Result<Vec<WorkoutRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_records(BufReader::new(File::open(path)?))
}

fn read_records(mut reader: impl BufRead) -> Result<Vec<WorkoutRecord>> {
    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut line_num = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_num += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::warn!("Skipping non-UTF-8 record at line {}: {}", line_num, e);
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse record at line {}: {}", line_num, e);
            }
        }
    }

    Ok(records)
}
