use crate::ballot::CAST_INDEX;
use crate::{
    derive_receipt, encrypt_ballot, Ballot, BallotStore, Candidate, Config, Election,
    ElectionStore, EncryptionKey, Error, Receipt, ReceiptLedger, StoreError, TallyEntry,
    TallyStore,
};

use chrono::Utc;
use uuid::Uuid;

const ELECTIONS_FILE: &str = "elections.db";
const CANDIDATES_FILE: &str = "candidates.db";
const VOTES_FILE: &str = "votes.db";
const RECEIPTS_FILE: &str = "receipts.db";
const TALLIES_FILE: &str = "tallies.db";

/// Returned to the caller after a successful cast. The vote id is the
/// voter's private handle to their ballot; the receipt hash is what they can
/// look for in the public ledger.
#[derive(Serialize, Debug, Clone)]
pub struct CastOutcome {
    pub vote_id: Uuid,
    pub receipt_hash: String,
}

/// The ballot lifecycle engine: composes the cipher, the stores and the
/// receipt ledger into `cast_vote` and its companion reads.
///
/// Everything takes an explicit `voter_id`; there is no ambient identity.
pub struct BallotBox {
    encryption_key: EncryptionKey,
    public_salt: String,
    elections: ElectionStore,
    ballots: BallotStore,
    tallies: TallyStore,
    receipts: ReceiptLedger,
}

impl BallotBox {
    /// Open the durable collections under `config.data_dir`.
    pub fn open(config: &Config) -> Result<Self, StoreError> {
        let dir = &config.data_dir;
        Ok(BallotBox {
            encryption_key: config.encryption_key.clone(),
            public_salt: config.public_salt.clone(),
            elections: ElectionStore::open(
                &dir.join(ELECTIONS_FILE),
                &dir.join(CANDIDATES_FILE),
            )?,
            ballots: BallotStore::open(&dir.join(VOTES_FILE))?,
            tallies: TallyStore::open(&dir.join(TALLIES_FILE))?,
            receipts: ReceiptLedger::open(&dir.join(RECEIPTS_FILE))?,
        })
    }

    /// An ephemeral box with no journals. Used by tests and callers that do
    /// not need durability.
    pub fn in_memory(encryption_key: EncryptionKey, public_salt: &str) -> Self {
        BallotBox {
            encryption_key,
            public_salt: public_salt.to_string(),
            elections: ElectionStore::in_memory(),
            ballots: BallotStore::in_memory(),
            tallies: TallyStore::in_memory(),
            receipts: ReceiptLedger::in_memory(),
        }
    }

    /// Cast one vote: validate, encrypt, persist, tally, publish the receipt.
    ///
    /// The persist step is the commit point. A duplicate-key rejection there
    /// means this voter already has a ballot in the election, and nothing
    /// else happens. If the tally or the receipt publish fails after the
    /// ballot persisted, the ballot stays cast; the discrepancy is logged and
    /// the error surfaced, and the journals are the reconciliation source.
    /// Rolling back a committed ballot is never attempted.
    pub fn cast_vote(
        &self,
        voter_id: &str,
        election_id: &str,
        candidate_id: &str,
    ) -> Result<CastOutcome, Error> {
        match self.elections.get(election_id)? {
            Some(election) if election.is_open => {}
            _ => return Err(Error::ElectionClosedOrMissing),
        }
        if !self
            .elections
            .candidate_in_election(election_id, candidate_id)?
        {
            return Err(Error::InvalidCandidate);
        }

        // The candidate choice lives on only inside the ciphertext and,
        // transiently, in the tally increment below. It is never logged.
        let sealed = encrypt_ballot(&self.encryption_key, candidate_id.as_bytes());

        let vote_id = Uuid::new_v4();
        let receipt_hash = derive_receipt(
            &vote_id.to_string(),
            &hex::encode(&sealed.ciphertext),
            &self.public_salt,
        );

        let ballot = Ballot {
            vote_id,
            election_id: election_id.to_string(),
            voter_id: voter_id.to_string(),
            ciphertext: sealed.ciphertext,
            nonce: sealed.nonce,
            tag: sealed.tag,
            created_at: Utc::now(),
            receipt_hash: receipt_hash.clone(),
        };

        match self.ballots.cast(ballot) {
            Ok(()) => {}
            Err(StoreError::DuplicateKey(index)) if index == CAST_INDEX => {
                return Err(Error::AlreadyVoted);
            }
            Err(err) => return Err(err.into()),
        }

        if let Err(err) = self.tallies.increment(election_id, candidate_id) {
            error!(
                "vote {} in election {} persisted but its tally increment failed, \
                 journals need reconciliation: {}",
                vote_id, election_id, err
            );
            return Err(err.into());
        }

        if let Err(err) = self.receipts.publish(&receipt_hash) {
            error!(
                "vote {} in election {} persisted and tallied but its receipt was not \
                 published, journals need reconciliation: {}",
                vote_id, election_id, err
            );
            return Err(err.into());
        }

        debug!("vote {} recorded in election {}", vote_id, election_id);
        Ok(CastOutcome {
            vote_id,
            receipt_hash,
        })
    }

    /// The receipt for a ballot, only for the voter who cast it. Absence and
    /// wrong ownership are indistinguishable.
    pub fn receipt(&self, vote_id: Uuid, voter_id: &str) -> Result<Receipt, Error> {
        let ballot = self
            .ballots
            .get(vote_id, voter_id)?
            .ok_or(Error::ReceiptNotFound)?;

        Ok(Receipt {
            election_id: ballot.election_id,
            receipt_hash: ballot.receipt_hash,
            created_at: ballot.created_at,
        })
    }

    pub fn has_voted(&self, election_id: &str, voter_id: &str) -> Result<bool, Error> {
        Ok(self.ballots.has_voted(election_id, voter_id)?)
    }

    /// The full public ledger, sorted. Requires no authorization: a hash
    /// reveals nothing about voter or choice.
    pub fn public_receipts(&self) -> Result<Vec<String>, Error> {
        Ok(self.receipts.list()?)
    }

    /// Check a recomputed or saved receipt hash against the public ledger.
    pub fn verify_receipt(&self, receipt_hash: &str) -> Result<bool, Error> {
        Ok(self.receipts.contains(receipt_hash)?)
    }

    /// Aggregate counts for one election. Candidates with no votes yet have
    /// no entry. Admin-only by caller policy.
    pub fn tallies(&self, election_id: &str) -> Result<Vec<TallyEntry>, Error> {
        Ok(self.tallies.list(election_id)?)
    }

    // Election roster operations, for the admin-side caller.

    pub fn create_election(&self, name: &str) -> Result<Election, Error> {
        Ok(self.elections.create(name)?)
    }

    pub fn set_election_open(&self, election_id: &str, is_open: bool) -> Result<Election, Error> {
        match self.elections.set_open(election_id, is_open) {
            Err(StoreError::MissingRow(_)) => Err(Error::ElectionClosedOrMissing),
            other => Ok(other?),
        }
    }

    pub fn election(&self, election_id: &str) -> Result<Option<Election>, Error> {
        Ok(self.elections.get(election_id)?)
    }

    pub fn elections(&self) -> Result<Vec<Election>, Error> {
        Ok(self.elections.list()?)
    }

    pub fn add_candidate(&self, election_id: &str, name: &str) -> Result<Candidate, Error> {
        match self.elections.add_candidate(election_id, name) {
            Err(StoreError::MissingRow(_)) => Err(Error::ElectionClosedOrMissing),
            other => Ok(other?),
        }
    }

    pub fn candidates(&self, election_id: &str) -> Result<Vec<Candidate>, Error> {
        Ok(self.elections.candidates(election_id)?)
    }
}
