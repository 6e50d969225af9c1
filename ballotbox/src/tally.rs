use crate::journal::{lock_store, Journal};
use crate::StoreError;

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;

/// Aggregate vote count for one candidate in one election. The only place
/// plaintext choice information accumulates, and only as a count.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TallyEntry {
    pub election_id: String,
    pub candidate_id: String,
    pub count: u64,
}

/// Durable per-(election, candidate) counters.
///
/// `increment` is create-with-1 or add-1 as one critical section: two
/// simultaneous first votes for an untallied candidate serialize on the store
/// lock and end at 2, never 1. Entries are created lazily, never decremented,
/// never deleted. Each update journals the whole entry; replay keeps the last
/// record per key.
pub struct TallyStore {
    inner: Mutex<Inner>,
}

struct Inner {
    journal: Journal,
    counts: BTreeMap<(String, String), u64>,
}

impl TallyStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let (journal, records) = Journal::open::<TallyEntry>(path)?;

        let mut counts = BTreeMap::new();
        for entry in records {
            counts.insert((entry.election_id, entry.candidate_id), entry.count);
        }

        Ok(TallyStore {
            inner: Mutex::new(Inner { journal, counts }),
        })
    }

    pub fn in_memory() -> Self {
        TallyStore {
            inner: Mutex::new(Inner {
                journal: Journal::ephemeral(),
                counts: BTreeMap::new(),
            }),
        }
    }

    /// Add one vote to the candidate's counter and return the new count.
    pub fn increment(&self, election_id: &str, candidate_id: &str) -> Result<u64, StoreError> {
        let mut inner = lock_store(&self.inner)?;

        let key = (election_id.to_string(), candidate_id.to_string());
        let count = inner.counts.get(&key).copied().unwrap_or(0) + 1;

        let entry = TallyEntry {
            election_id: election_id.to_string(),
            candidate_id: candidate_id.to_string(),
            count,
        };
        inner.journal.append(&entry)?;
        inner.counts.insert(key, count);
        Ok(count)
    }

    /// Snapshot of one election's tallies, sorted by candidate id.
    pub fn list(&self, election_id: &str) -> Result<Vec<TallyEntry>, StoreError> {
        let inner = lock_store(&self.inner)?;
        Ok(inner
            .counts
            .iter()
            .filter(|((election, _), _)| election == election_id)
            .map(|((election, candidate), count)| TallyEntry {
                election_id: election.clone(),
                candidate_id: candidate.clone(),
                count: *count,
            })
            .collect())
    }
}
