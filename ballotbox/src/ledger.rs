use crate::journal::{lock_store, Journal};
use crate::StoreError;

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::Path;

/// The public, append-only set of receipt hashes.
///
/// A receipt hash alone reveals nothing about voter or choice, so the whole
/// ledger is served unauthenticated. Hashes are kept in sorted order so the
/// published list is stable and diffable.
pub struct ReceiptLedger {
    inner: Mutex<Inner>,
}

struct Inner {
    journal: Journal,
    hashes: BTreeSet<String>,
}

impl ReceiptLedger {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let (journal, records) = Journal::open::<String>(path)?;

        Ok(ReceiptLedger {
            inner: Mutex::new(Inner {
                journal,
                hashes: records.into_iter().collect(),
            }),
        })
    }

    pub fn in_memory() -> Self {
        ReceiptLedger {
            inner: Mutex::new(Inner {
                journal: Journal::ephemeral(),
                hashes: BTreeSet::new(),
            }),
        }
    }

    /// Record a receipt hash. Idempotent: the hash is derived
    /// deterministically, so republishing carries no new information and is
    /// a no-op.
    pub fn publish(&self, receipt_hash: &str) -> Result<(), StoreError> {
        let mut inner = lock_store(&self.inner)?;
        if inner.hashes.contains(receipt_hash) {
            return Ok(());
        }

        inner.journal.append(receipt_hash)?;
        inner.hashes.insert(receipt_hash.to_string());
        Ok(())
    }

    /// Voter-side verification: is this hash in the public set?
    pub fn contains(&self, receipt_hash: &str) -> Result<bool, StoreError> {
        let inner = lock_store(&self.inner)?;
        Ok(inner.hashes.contains(receipt_hash))
    }

    /// All published hashes, sorted ascending.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let inner = lock_store(&self.inner)?;
        Ok(inner.hashes.iter().cloned().collect())
    }
}
