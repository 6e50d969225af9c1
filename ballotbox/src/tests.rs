use super::*;
use std::path::Path;
use std::sync::Arc;
use std::thread;

fn test_key() -> EncryptionKey {
    EncryptionKey::from_hex(&"ab".repeat(32)).unwrap()
}

fn open_box() -> BallotBox {
    BallotBox::in_memory(test_key(), "test_public_salt")
}

fn durable_box(data_dir: &Path) -> BallotBox {
    let config = Config {
        encryption_key: test_key(),
        public_salt: "test_public_salt".to_string(),
        data_dir: data_dir.to_path_buf(),
    };
    BallotBox::open(&config).unwrap()
}

#[test]
fn end_to_end_vote() {
    let ballot_box = open_box();

    // Set up an open election with two candidates.
    let election = ballot_box.create_election("Board 2026").unwrap();
    let alice = ballot_box.add_candidate(&election.id, "Alice").unwrap();
    let bob = ballot_box.add_candidate(&election.id, "Bob").unwrap();

    assert!(!ballot_box.has_voted(&election.id, "voter-1").unwrap());

    // Cast a vote for Alice.
    let outcome = ballot_box
        .cast_vote("voter-1", &election.id, &alice.id)
        .unwrap();
    assert_eq!(outcome.receipt_hash.len(), 64);

    // The voter is now marked as having voted.
    assert!(ballot_box.has_voted(&election.id, "voter-1").unwrap());

    // Exactly one tally entry exists: Alice at 1. Bob has none yet.
    let tallies = ballot_box.tallies(&election.id).unwrap();
    assert_eq!(tallies.len(), 1);
    assert_eq!(tallies[0].candidate_id, alice.id);
    assert_eq!(tallies[0].count, 1);
    assert!(!tallies.iter().any(|entry| entry.candidate_id == bob.id));

    // The public ledger contains exactly the returned hash.
    assert_eq!(
        ballot_box.public_receipts().unwrap(),
        vec![outcome.receipt_hash.clone()]
    );
    assert!(ballot_box.verify_receipt(&outcome.receipt_hash).unwrap());

    // The voter can fetch their receipt; another voter cannot.
    let receipt = ballot_box.receipt(outcome.vote_id, "voter-1").unwrap();
    assert_eq!(receipt.election_id, election.id);
    assert_eq!(receipt.receipt_hash, outcome.receipt_hash);
    assert!(matches!(
        ballot_box.receipt(outcome.vote_id, "voter-2"),
        Err(Error::ReceiptNotFound)
    ));
}

#[test]
fn a_second_cast_fails_and_changes_nothing() {
    let ballot_box = open_box();

    let election = ballot_box.create_election("Board 2026").unwrap();
    let alice = ballot_box.add_candidate(&election.id, "Alice").unwrap();
    let bob = ballot_box.add_candidate(&election.id, "Bob").unwrap();

    ballot_box
        .cast_vote("voter-1", &election.id, &alice.id)
        .unwrap();

    // A repeat cast fails regardless of candidate.
    assert!(matches!(
        ballot_box.cast_vote("voter-1", &election.id, &alice.id),
        Err(Error::AlreadyVoted)
    ));
    assert!(matches!(
        ballot_box.cast_vote("voter-1", &election.id, &bob.id),
        Err(Error::AlreadyVoted)
    ));

    // No tally moved and no extra receipt appeared.
    let tallies = ballot_box.tallies(&election.id).unwrap();
    assert_eq!(tallies.len(), 1);
    assert_eq!(tallies[0].count, 1);
    assert_eq!(ballot_box.public_receipts().unwrap().len(), 1);
}

#[test]
fn closed_and_missing_elections_reject_casts() {
    let ballot_box = open_box();

    let election = ballot_box.create_election("Board 2026").unwrap();
    let alice = ballot_box.add_candidate(&election.id, "Alice").unwrap();
    ballot_box.set_election_open(&election.id, false).unwrap();

    assert!(matches!(
        ballot_box.cast_vote("voter-1", &election.id, &alice.id),
        Err(Error::ElectionClosedOrMissing)
    ));
    assert!(matches!(
        ballot_box.cast_vote("voter-1", "no-such-election", &alice.id),
        Err(Error::ElectionClosedOrMissing)
    ));

    // Reopening lets the cast through.
    ballot_box.set_election_open(&election.id, true).unwrap();
    ballot_box
        .cast_vote("voter-1", &election.id, &alice.id)
        .unwrap();
}

#[test]
fn unknown_candidates_are_rejected_before_any_side_effect() {
    let ballot_box = open_box();

    let election = ballot_box.create_election("Board 2026").unwrap();
    ballot_box.add_candidate(&election.id, "Alice").unwrap();
    let other = ballot_box.create_election("Other").unwrap();
    let carol = ballot_box.add_candidate(&other.id, "Carol").unwrap();

    // Empty, unknown, and cross-election candidate ids all fail.
    for candidate_id in ["", "no-such-candidate", carol.id.as_str()].iter() {
        assert!(matches!(
            ballot_box.cast_vote("voter-1", &election.id, candidate_id),
            Err(Error::InvalidCandidate)
        ));
    }

    assert!(!ballot_box.has_voted(&election.id, "voter-1").unwrap());
    assert!(ballot_box.tallies(&election.id).unwrap().is_empty());
    assert!(ballot_box.public_receipts().unwrap().is_empty());
}

#[test]
fn concurrent_casts_by_one_voter_yield_exactly_one_ballot() {
    let ballot_box = Arc::new(open_box());

    let election = ballot_box.create_election("Board 2026").unwrap();
    let alice = ballot_box.add_candidate(&election.id, "Alice").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ballot_box = Arc::clone(&ballot_box);
            let election_id = election.id.clone();
            let candidate_id = alice.id.clone();
            thread::spawn(move || ballot_box.cast_vote("voter-1", &election_id, &candidate_id))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let successes = results.iter().filter(|result| result.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|result| matches!(result, Err(Error::AlreadyVoted)))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(duplicates, 7);

    let tallies = ballot_box.tallies(&election.id).unwrap();
    assert_eq!(tallies.len(), 1);
    assert_eq!(tallies[0].count, 1);
    assert_eq!(ballot_box.public_receipts().unwrap().len(), 1);
}

#[test]
fn concurrent_first_votes_all_count() {
    let ballot_box = Arc::new(open_box());

    let election = ballot_box.create_election("Board 2026").unwrap();
    let alice = ballot_box.add_candidate(&election.id, "Alice").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|voter| {
            let ballot_box = Arc::clone(&ballot_box);
            let election_id = election.id.clone();
            let candidate_id = alice.id.clone();
            thread::spawn(move || {
                ballot_box.cast_vote(&format!("voter-{}", voter), &election_id, &candidate_id)
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let tallies = ballot_box.tallies(&election.id).unwrap();
    assert_eq!(tallies.len(), 1);
    assert_eq!(tallies[0].count, 8);
    assert_eq!(ballot_box.public_receipts().unwrap().len(), 8);
}

#[test]
fn the_stored_ballot_is_encrypted_but_recoverable_with_the_key() {
    let dir = tempfile::tempdir().unwrap();
    let ballot_box = durable_box(dir.path());

    let election = ballot_box.create_election("Board 2026").unwrap();
    let alice = ballot_box.add_candidate(&election.id, "Alice").unwrap();
    let outcome = ballot_box
        .cast_vote("voter-1", &election.id, &alice.id)
        .unwrap();

    // Read the row back through the store and check the ciphertext is not
    // the candidate id in the clear, but opens to it under the key.
    let store = BallotStore::open(&dir.path().join("votes.db")).unwrap();
    let ballot = store.get(outcome.vote_id, "voter-1").unwrap().unwrap();

    assert_ne!(ballot.ciphertext, alice.id.as_bytes());
    let sealed = EncryptedBallot {
        ciphertext: ballot.ciphertext,
        nonce: ballot.nonce,
        tag: ballot.tag,
    };
    let plaintext = decrypt_ballot(&test_key(), &sealed).unwrap();
    assert_eq!(plaintext, alice.id.as_bytes());
}

#[test]
fn a_reopened_box_keeps_all_state_and_constraints() {
    let dir = tempfile::tempdir().unwrap();

    let (election_id, alice_id, outcome) = {
        let ballot_box = durable_box(dir.path());
        let election = ballot_box.create_election("Board 2026").unwrap();
        let alice = ballot_box.add_candidate(&election.id, "Alice").unwrap();
        let outcome = ballot_box
            .cast_vote("voter-1", &election.id, &alice.id)
            .unwrap();
        (election.id, alice.id, outcome)
    };

    let ballot_box = durable_box(dir.path());

    assert!(ballot_box.has_voted(&election_id, "voter-1").unwrap());
    assert!(matches!(
        ballot_box.cast_vote("voter-1", &election_id, &alice_id),
        Err(Error::AlreadyVoted)
    ));

    let tallies = ballot_box.tallies(&election_id).unwrap();
    assert_eq!(tallies[0].count, 1);
    assert_eq!(
        ballot_box.public_receipts().unwrap(),
        vec![outcome.receipt_hash.clone()]
    );

    let receipt = ballot_box.receipt(outcome.vote_id, "voter-1").unwrap();
    assert_eq!(receipt.receipt_hash, outcome.receipt_hash);

    // A second voter can still vote after the reload.
    ballot_box
        .cast_vote("voter-2", &election_id, &alice_id)
        .unwrap();
    assert_eq!(ballot_box.tallies(&election_id).unwrap()[0].count, 2);
}

#[test]
fn receipts_are_recomputable_by_the_voter() {
    let dir = tempfile::tempdir().unwrap();
    let ballot_box = durable_box(dir.path());

    let election = ballot_box.create_election("Board 2026").unwrap();
    let alice = ballot_box.add_candidate(&election.id, "Alice").unwrap();
    let outcome = ballot_box
        .cast_vote("voter-1", &election.id, &alice.id)
        .unwrap();

    // A voter holding their vote id and ballot row can re-derive the hash
    // and find it in the public ledger.
    let store = BallotStore::open(&dir.path().join("votes.db")).unwrap();
    let ballot = store.get(outcome.vote_id, "voter-1").unwrap().unwrap();
    let recomputed = derive_receipt(
        &outcome.vote_id.to_string(),
        &hex::encode(&ballot.ciphertext),
        "test_public_salt",
    );

    assert_eq!(recomputed, outcome.receipt_hash);
    assert!(ballot_box.verify_receipt(&recomputed).unwrap());
    assert!(!ballot_box.verify_receipt(&"0".repeat(64)).unwrap());
}
