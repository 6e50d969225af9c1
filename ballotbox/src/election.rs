use crate::journal::{lock_store, Journal};
use crate::StoreError;

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::path::Path;
use uuid::Uuid;

/// An election. Only `is_open` gates whether votes may be cast.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Election {
    pub id: String,
    pub name: String,
    pub is_open: bool,
}

/// A candidate, belonging to exactly one election.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub election_id: String,
    pub name: String,
}

/// The election/candidate roster.
///
/// Elections journal every state change (last record wins on replay);
/// candidates are insert-only. Insertion order is the display order, so the
/// maps are `IndexMap`s rather than unstable-ordered hashmaps.
pub struct ElectionStore {
    inner: Mutex<Inner>,
}

struct Inner {
    elections_journal: Journal,
    candidates_journal: Journal,
    elections: IndexMap<String, Election>,
    candidates: IndexMap<String, Candidate>,
}

impl ElectionStore {
    pub fn open(elections_path: &Path, candidates_path: &Path) -> Result<Self, StoreError> {
        let (elections_journal, election_records) = Journal::open::<Election>(elections_path)?;
        let (candidates_journal, candidate_records) = Journal::open::<Candidate>(candidates_path)?;

        let mut elections = IndexMap::new();
        for election in election_records {
            elections.insert(election.id.clone(), election);
        }

        let mut candidates = IndexMap::new();
        for candidate in candidate_records {
            if candidates
                .insert(candidate.id.clone(), candidate)
                .is_some()
            {
                return Err(StoreError::DuplicateKey("candidate_id"));
            }
        }

        Ok(ElectionStore {
            inner: Mutex::new(Inner {
                elections_journal,
                candidates_journal,
                elections,
                candidates,
            }),
        })
    }

    pub fn in_memory() -> Self {
        ElectionStore {
            inner: Mutex::new(Inner {
                elections_journal: Journal::ephemeral(),
                candidates_journal: Journal::ephemeral(),
                elections: IndexMap::new(),
                candidates: IndexMap::new(),
            }),
        }
    }

    /// Create a new election. Elections start open.
    pub fn create(&self, name: &str) -> Result<Election, StoreError> {
        let election = Election {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            is_open: true,
        };

        let mut inner = lock_store(&self.inner)?;
        inner.elections_journal.append(&election)?;
        inner.elections.insert(election.id.clone(), election.clone());
        Ok(election)
    }

    /// Open or close an election for voting.
    pub fn set_open(&self, election_id: &str, is_open: bool) -> Result<Election, StoreError> {
        let mut inner = lock_store(&self.inner)?;

        let mut election = inner
            .elections
            .get(election_id)
            .cloned()
            .ok_or(StoreError::MissingRow("election"))?;
        election.is_open = is_open;

        inner.elections_journal.append(&election)?;
        inner.elections.insert(election.id.clone(), election.clone());
        Ok(election)
    }

    pub fn get(&self, election_id: &str) -> Result<Option<Election>, StoreError> {
        let inner = lock_store(&self.inner)?;
        Ok(inner.elections.get(election_id).cloned())
    }

    pub fn list(&self) -> Result<Vec<Election>, StoreError> {
        let inner = lock_store(&self.inner)?;
        Ok(inner.elections.values().cloned().collect())
    }

    /// Add a candidate to an existing election.
    pub fn add_candidate(&self, election_id: &str, name: &str) -> Result<Candidate, StoreError> {
        let mut inner = lock_store(&self.inner)?;

        if !inner.elections.contains_key(election_id) {
            return Err(StoreError::MissingRow("election"));
        }

        let candidate = Candidate {
            id: Uuid::new_v4().to_string(),
            election_id: election_id.to_string(),
            name: name.to_string(),
        };

        inner.candidates_journal.append(&candidate)?;
        inner
            .candidates
            .insert(candidate.id.clone(), candidate.clone());
        Ok(candidate)
    }

    /// Candidates of one election, in insertion order.
    pub fn candidates(&self, election_id: &str) -> Result<Vec<Candidate>, StoreError> {
        let inner = lock_store(&self.inner)?;
        Ok(inner
            .candidates
            .values()
            .filter(|candidate| candidate.election_id == election_id)
            .cloned()
            .collect())
    }

    pub fn candidate_in_election(
        &self,
        election_id: &str,
        candidate_id: &str,
    ) -> Result<bool, StoreError> {
        let inner = lock_store(&self.inner)?;
        Ok(inner
            .candidates
            .get(candidate_id)
            .map_or(false, |candidate| candidate.election_id == election_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elections_start_open_and_can_be_toggled() {
        let store = ElectionStore::in_memory();

        let election = store.create("Board 2026").unwrap();
        assert!(election.is_open);

        let closed = store.set_open(&election.id, false).unwrap();
        assert!(!closed.is_open);
        assert!(!store.get(&election.id).unwrap().unwrap().is_open);
    }

    #[test]
    fn toggling_a_missing_election_fails() {
        let store = ElectionStore::in_memory();
        assert!(matches!(
            store.set_open("nope", true),
            Err(StoreError::MissingRow("election"))
        ));
    }

    #[test]
    fn candidates_require_an_election_and_keep_insertion_order() {
        let store = ElectionStore::in_memory();

        assert!(matches!(
            store.add_candidate("nope", "Alice"),
            Err(StoreError::MissingRow("election"))
        ));

        let election = store.create("Board 2026").unwrap();
        let alice = store.add_candidate(&election.id, "Alice").unwrap();
        let bob = store.add_candidate(&election.id, "Bob").unwrap();

        let names: Vec<String> = store
            .candidates(&election.id)
            .unwrap()
            .into_iter()
            .map(|candidate| candidate.name)
            .collect();
        assert_eq!(names, vec!["Alice".to_string(), "Bob".to_string()]);

        assert!(store
            .candidate_in_election(&election.id, &alice.id)
            .unwrap());
        let other = store.create("Other").unwrap();
        assert!(!store.candidate_in_election(&other.id, &bob.id).unwrap());
    }

    #[test]
    fn journal_reload_preserves_roster_state() {
        let dir = tempfile::tempdir().unwrap();
        let elections_path = dir.path().join("elections.db");
        let candidates_path = dir.path().join("candidates.db");

        let election_id = {
            let store = ElectionStore::open(&elections_path, &candidates_path).unwrap();
            let election = store.create("Board 2026").unwrap();
            store.add_candidate(&election.id, "Alice").unwrap();
            store.set_open(&election.id, false).unwrap();
            election.id
        };

        let store = ElectionStore::open(&elections_path, &candidates_path).unwrap();
        let election = store.get(&election_id).unwrap().unwrap();
        assert!(!election.is_open);
        assert_eq!(store.candidates(&election_id).unwrap().len(), 1);
    }
}
