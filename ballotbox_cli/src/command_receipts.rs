use ballotbox::BallotBox;

/// The public ledger, printed the way it would be served: a JSON array of
/// hashes, sorted, no authorization.
pub fn run(ballot_box: &BallotBox) {
    let receipts = crate::unwrap_or_exit(ballot_box.public_receipts());
    println!(
        "{}",
        serde_json::to_string_pretty(&receipts).expect("ballotbox: receipt list is always JSON")
    );
}
