use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Derive the public receipt hash for a recorded vote.
///
/// SHA-256 over `vote_id | "|" | ciphertext_hex | "|" | public_salt`, hex
/// encoded. The `|` separator is unambiguous: vote ids are hyphenated UUIDs
/// and the ciphertext is lowercase hex, so neither field can contain it.
///
/// Deterministic and one-way: a voter who kept their vote id can recompute
/// the hash and look for it in the public ledger without revealing their
/// choice to anyone.
pub fn derive_receipt(vote_id: &str, ciphertext_hex: &str, public_salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(vote_id.as_bytes());
    hasher.update(b"|");
    hasher.update(ciphertext_hex.as_bytes());
    hasher.update(b"|");
    hasher.update(public_salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// What a voter gets back when they look up their own ballot.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Receipt {
    pub election_id: String,
    pub receipt_hash: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let first = derive_receipt("vote-1", "deadbeef", "salt");
        let second = derive_receipt("vote-1", "deadbeef", "salt");

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn every_input_matters() {
        let base = derive_receipt("vote-1", "deadbeef", "salt");

        assert_ne!(base, derive_receipt("vote-2", "deadbeef", "salt"));
        assert_ne!(base, derive_receipt("vote-1", "deadbeff", "salt"));
        assert_ne!(base, derive_receipt("vote-1", "deadbeef", "other salt"));
    }
}
