use ballotbox::BallotBox;
use uuid::Uuid;

pub fn run(matches: &clap::ArgMatches, ballot_box: &BallotBox) {
    if let Some(matches) = matches.subcommand_matches("cast") {
        let election_id = matches.value_of("ELECTION-ID").unwrap();
        let candidate_id = matches.value_of("CANDIDATE-ID").unwrap();
        let voter_id = matches.value_of("voter").unwrap();

        let outcome =
            crate::unwrap_or_exit(ballot_box.cast_vote(voter_id, election_id, candidate_id));
        println!("vote id:      {}", outcome.vote_id);
        println!("receipt hash: {}", outcome.receipt_hash);
    } else if let Some(matches) = matches.subcommand_matches("receipt") {
        let raw_vote_id = matches.value_of("VOTE-ID").unwrap();
        let vote_id = match Uuid::parse_str(raw_vote_id) {
            Ok(vote_id) => vote_id,
            Err(_) => {
                eprintln!("ballotbox vote receipt: '{}' is not a vote id", raw_vote_id);
                std::process::exit(1);
            }
        };
        let voter_id = matches.value_of("voter").unwrap();

        let receipt = crate::unwrap_or_exit(ballot_box.receipt(vote_id, voter_id));
        println!("election:     {}", receipt.election_id);
        println!("receipt hash: {}", receipt.receipt_hash);
        println!("recorded at:  {}", receipt.created_at.to_rfc3339());
    } else if let Some(matches) = matches.subcommand_matches("verify") {
        let receipt_hash = matches.value_of("RECEIPT-HASH").unwrap();
        let present = crate::unwrap_or_exit(ballot_box.verify_receipt(receipt_hash));
        if present {
            println!("recorded");
        } else {
            println!("not found");
            std::process::exit(1);
        }
    } else {
        eprintln!("ballotbox vote: no subcommand given, try --help");
        std::process::exit(1);
    }
}
