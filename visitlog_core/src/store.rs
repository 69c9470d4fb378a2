//! CSV-backed record store with file locking.
//!
//! The whole visitor log lives in one CSV file. Every load reads the full
//! file and every save rewrites it, so callers that read-modify-write must
//! hold [`CsvStore::lock_exclusive`] for the duration of the cycle.

use crate::{Error, Result, VisitRecord};
use chrono::{NaiveDate, NaiveTime};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Column names of the visitor log, in file order
pub const HEADER: [&str; 9] = [
    "id",
    "nome",
    "cpf",
    "empresa",
    "destino",
    "data_entrada",
    "hora_entrada",
    "data_saida",
    "hora_saida",
];

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S";

/// A row of the visitor log as it appears on disk
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "cpf")]
    pub personal_id: String,
    #[serde(rename = "empresa")]
    pub company: String,
    #[serde(rename = "destino")]
    pub destination: String,
    #[serde(rename = "data_entrada")]
    pub entry_date: String,
    #[serde(rename = "hora_entrada")]
    pub entry_time: String,
    #[serde(rename = "data_saida")]
    pub exit_date: Option<String>,
    #[serde(rename = "hora_saida")]
    pub exit_time: Option<String>,
}

impl From<&VisitRecord> for CsvRow {
    fn from(record: &VisitRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            name: record.name.clone(),
            personal_id: record.personal_id.clone(),
            company: record.company.clone(),
            destination: record.destination.clone(),
            entry_date: record.entry_date.format(DATE_FORMAT).to_string(),
            entry_time: record.entry_time.format(TIME_FORMAT).to_string(),
            exit_date: record.exit_date.map(|d| d.format(DATE_FORMAT).to_string()),
            exit_time: record.exit_time.map(|t| t.format(TIME_FORMAT).to_string()),
        }
    }
}

impl CsvRow {
    /// Interpret the row; `line` is the 1-based file line used in errors
    fn into_record(self, line: usize) -> Result<VisitRecord> {
        let malformed = |reason: String| Error::MalformedRecord { line, reason };

        let id = self
            .id
            .trim()
            .parse::<u64>()
            .map_err(|e| malformed(format!("invalid id {:?}: {}", self.id, e)))?;

        let entry_date = parse_date(&self.entry_date).map_err(malformed)?;
        let entry_time = parse_time(&self.entry_time).map_err(malformed)?;

        let exit_date = non_empty(self.exit_date)
            .map(|s| parse_date(&s))
            .transpose()
            .map_err(malformed)?;
        let exit_time = non_empty(self.exit_time)
            .map(|s| parse_time(&s))
            .transpose()
            .map_err(malformed)?;

        Ok(VisitRecord {
            id,
            name: self.name,
            personal_id: self.personal_id,
            company: self.company,
            destination: self.destination,
            entry_date,
            entry_time,
            exit_date,
            exit_time,
        })
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| format!("invalid date {:?}: {}", s, e))
}

fn parse_time(s: &str) -> std::result::Result<NaiveTime, String> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| format!("invalid time {:?}: {}", s, e))
}

/// Exclusive lock over the store, released on drop
pub struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release store lock: {}", e);
        }
    }
}

/// Visitor log persisted as a single CSV file
#[derive(Clone, Debug)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Create a store for the given CSV path (nothing is touched on disk)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sidecar file used to serialize read-modify-write cycles across processes
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("visitlog"));
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Create the file with only the header row if it does not exist yet
    ///
    /// Runs under the store lock so a concurrent registration can never be
    /// overwritten by the empty file. Returns true when a new file was created.
    pub fn init(&self) -> Result<bool> {
        let _lock = self.lock_exclusive()?;
        self.create_if_missing()
    }

    fn create_if_missing(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&[])?;
        tracing::info!("Initialized visitor log at {:?}", self.path);
        Ok(true)
    }

    /// Acquire the store's exclusive lock, blocking until it is available
    pub fn lock_exclusive(&self) -> Result<StoreLock> {
        self.ensure_parent_dir()?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        file.lock_exclusive()?;
        Ok(StoreLock { file })
    }

    /// Load every record in file order
    ///
    /// A missing file is created with the header row and yields no records.
    /// Any malformed row fails the whole load.
    pub fn load(&self) -> Result<Vec<VisitRecord>> {
        if !self.path.exists() && self.init()? {
            return Ok(Vec::new());
        }
        self.read_all()
    }

    /// Same as [`CsvStore::load`] for a caller already holding the store lock
    pub fn load_locked(&self, _lock: &StoreLock) -> Result<Vec<VisitRecord>> {
        if self.create_if_missing()? {
            return Ok(Vec::new());
        }
        self.read_all()
    }

    fn read_all(&self) -> Result<Vec<VisitRecord>> {
        let file = File::open(&self.path)?;
        // Acquire shared lock for reading
        file.lock_shared()?;
        let records = read_records(&file);
        file.unlock()?;

        let records = records?;
        tracing::debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    /// Replace the file contents with the given records
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, records: &[VisitRecord]) -> Result<()> {
        self.ensure_parent_dir()?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let temp = NamedTempFile::new_in(dir)?;

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(temp.as_file());
            // Written by hand so an empty log still carries the header
            writer.write_record(HEADER)?;
            for record in records {
                writer.serialize(CsvRow::from(record))?;
            }
            writer.flush()?;
        }

        temp.as_file().sync_all()?;

        // Atomically replace the old log
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} records to {:?}", records.len(), self.path);
        Ok(())
    }
}

fn read_records(file: &File) -> Result<Vec<VisitRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(std::io::BufReader::new(file));

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        // Line 1 is the header
        let row = result?;
        records.push(row.into_record(index + 2)?);
    }
    Ok(records)
}
