use crate::StoreError;

use parking_lot::{Mutex, MutexGuard};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::Path;
use std::time::Duration;

/// Upper bound on waiting for a store's critical section. A store call never
/// blocks past this; it surfaces `StoreError::LockTimeout` instead.
pub(crate) const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn lock_store<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex.try_lock_for(LOCK_TIMEOUT).ok_or(StoreError::LockTimeout)
}

/// Append-only journal backing one collection: one JSON document per line,
/// flushed on every append, replayed in full on open.
///
/// Without a path the journal is a no-op and the collection lives purely in
/// memory (tests, ephemeral boxes).
pub(crate) struct Journal {
    file: Option<File>,
}

impl Journal {
    /// Open the journal at `path`, creating parent directories as needed,
    /// and return every record currently in it.
    pub fn open<T: DeserializeOwned>(path: &Path) -> Result<(Self, Vec<T>), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut records = Vec::new();
        match File::open(path) {
            Ok(file) => {
                for line in BufReader::new(file).lines() {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    records.push(serde_json::from_str(&line)?);
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok((Journal { file: Some(file) }, records))
    }

    pub fn ephemeral() -> Self {
        Journal { file: None }
    }

    /// Append one record and flush it. Callers update their in-memory indexes
    /// only after this returns, so a failed write never leaves phantom rows.
    pub fn append<T: Serialize + ?Sized>(&mut self, record: &T) -> Result<(), StoreError> {
        if let Some(file) = self.file.as_mut() {
            let mut line = serde_json::to_vec(record)?;
            line.push(b'\n');
            file.write_all(&line)?;
            file.flush()?;
        }
        Ok(())
    }
}
