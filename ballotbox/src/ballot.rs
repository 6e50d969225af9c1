use crate::journal::{lock_store, Journal};
use crate::StoreError;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use uuid::Uuid;

/// Index names carried by `StoreError::DuplicateKey`.
pub const VOTE_ID_INDEX: &str = "vote_id";
pub const CAST_INDEX: &str = "election_id,voter_id";

/// An encrypted vote record. Immutable once persisted; there is no update or
/// delete. The candidate choice exists only inside `ciphertext`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ballot {
    pub vote_id: Uuid,
    pub election_id: String,
    pub voter_id: String,
    #[serde(with = "hex_serde")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "hex_serde")]
    pub nonce: Vec<u8>,
    #[serde(with = "hex_serde")]
    pub tag: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub receipt_hash: String,
}

/// Durable store of cast ballots.
///
/// Two unique indexes are enforced inside a single critical section:
/// `vote_id` (globally unique) and `(election_id, voter_id)` (the
/// one-vote-per-voter-per-election invariant). Under concurrent casts for the
/// same voter and election, exactly one succeeds.
pub struct BallotStore {
    inner: Mutex<Inner>,
}

struct Inner {
    journal: Journal,
    by_vote_id: BTreeMap<Uuid, Ballot>,
    cast_index: BTreeSet<(String, String)>,
}

impl Inner {
    fn check_unique(&self, ballot: &Ballot) -> Result<(), StoreError> {
        if self.by_vote_id.contains_key(&ballot.vote_id) {
            return Err(StoreError::DuplicateKey(VOTE_ID_INDEX));
        }
        let cast_key = (ballot.election_id.clone(), ballot.voter_id.clone());
        if self.cast_index.contains(&cast_key) {
            return Err(StoreError::DuplicateKey(CAST_INDEX));
        }
        Ok(())
    }

    fn index(&mut self, ballot: Ballot) {
        self.cast_index
            .insert((ballot.election_id.clone(), ballot.voter_id.clone()));
        self.by_vote_id.insert(ballot.vote_id, ballot);
    }
}

impl BallotStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let (journal, records) = Journal::open::<Ballot>(path)?;

        let mut inner = Inner {
            journal,
            by_vote_id: BTreeMap::new(),
            cast_index: BTreeSet::new(),
        };
        for ballot in records {
            inner.check_unique(&ballot)?;
            inner.index(ballot);
        }

        Ok(BallotStore {
            inner: Mutex::new(inner),
        })
    }

    pub fn in_memory() -> Self {
        BallotStore {
            inner: Mutex::new(Inner {
                journal: Journal::ephemeral(),
                by_vote_id: BTreeMap::new(),
                cast_index: BTreeSet::new(),
            }),
        }
    }

    /// Persist a ballot, enforcing both unique indexes atomically.
    ///
    /// The journal write happens before the indexes are updated, so a failed
    /// append leaves no trace, and a successful return is durable.
    pub fn cast(&self, ballot: Ballot) -> Result<(), StoreError> {
        let mut inner = lock_store(&self.inner)?;
        inner.check_unique(&ballot)?;
        inner.journal.append(&ballot)?;
        inner.index(ballot);
        Ok(())
    }

    /// Fetch a ballot by id, but only for the voter who cast it. A wrong
    /// owner sees the same `None` as a missing ballot, so ballot existence
    /// cannot be probed across voters.
    pub fn get(&self, vote_id: Uuid, voter_id: &str) -> Result<Option<Ballot>, StoreError> {
        let inner = lock_store(&self.inner)?;
        Ok(inner
            .by_vote_id
            .get(&vote_id)
            .filter(|ballot| ballot.voter_id == voter_id)
            .cloned())
    }

    pub fn has_voted(&self, election_id: &str, voter_id: &str) -> Result<bool, StoreError> {
        let inner = lock_store(&self.inner)?;
        Ok(inner
            .cast_index
            .contains(&(election_id.to_string(), voter_id.to_string())))
    }
}
