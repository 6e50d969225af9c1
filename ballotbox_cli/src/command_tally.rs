use ballotbox::BallotBox;

/// Aggregate counts for one election, joined with candidate names. Candidates
/// nobody has voted for yet have no tally entry and print as 0.
pub fn run(matches: &clap::ArgMatches, ballot_box: &BallotBox) {
    let election_id = matches.value_of("ELECTION-ID").unwrap();

    let candidates = crate::unwrap_or_exit(ballot_box.candidates(election_id));
    let tallies = crate::unwrap_or_exit(ballot_box.tallies(election_id));

    if candidates.is_empty() {
        eprintln!("ballotbox tally: election has no candidates");
        std::process::exit(1);
    }

    for candidate in &candidates {
        let count = tallies
            .iter()
            .find(|entry| entry.candidate_id == candidate.id)
            .map_or(0, |entry| entry.count);
        println!("{:>6}  {}  {}", count, candidate.id, candidate.name);
    }
}
