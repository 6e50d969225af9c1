use ballotbox::{BallotBox, Election};

pub fn run(matches: &clap::ArgMatches, ballot_box: &BallotBox) {
    if let Some(matches) = matches.subcommand_matches("create") {
        let name = matches.value_of("NAME").unwrap();
        let election = crate::unwrap_or_exit(ballot_box.create_election(name));
        print_election(&election);
    } else if let Some(matches) = matches.subcommand_matches("open") {
        let election_id = matches.value_of("ELECTION-ID").unwrap();
        let election = crate::unwrap_or_exit(ballot_box.set_election_open(election_id, true));
        print_election(&election);
    } else if let Some(matches) = matches.subcommand_matches("close") {
        let election_id = matches.value_of("ELECTION-ID").unwrap();
        let election = crate::unwrap_or_exit(ballot_box.set_election_open(election_id, false));
        print_election(&election);
    } else if let Some(matches) = matches.subcommand_matches("show") {
        let election_id = matches.value_of("ELECTION-ID").unwrap();
        match crate::unwrap_or_exit(ballot_box.election(election_id)) {
            Some(election) => {
                print_election(&election);
                for candidate in crate::unwrap_or_exit(ballot_box.candidates(election_id)) {
                    println!("  {}  {}", candidate.id, candidate.name);
                }
            }
            None => {
                eprintln!("ballotbox election show: no such election");
                std::process::exit(1);
            }
        }
    } else if matches.subcommand_matches("list").is_some() {
        for election in crate::unwrap_or_exit(ballot_box.elections()) {
            print_election(&election);
        }
    } else {
        eprintln!("ballotbox election: no subcommand given, try --help");
        std::process::exit(1);
    }
}

pub fn run_candidate(matches: &clap::ArgMatches, ballot_box: &BallotBox) {
    if let Some(matches) = matches.subcommand_matches("add") {
        let election_id = matches.value_of("ELECTION-ID").unwrap();
        let name = matches.value_of("NAME").unwrap();
        let candidate = crate::unwrap_or_exit(ballot_box.add_candidate(election_id, name));
        println!("{}  {}", candidate.id, candidate.name);
    } else {
        eprintln!("ballotbox candidate: no subcommand given, try --help");
        std::process::exit(1);
    }
}

fn print_election(election: &Election) {
    let state = if election.is_open { "open" } else { "closed" };
    println!("{}  {}  {}", election.id, state, election.name);
}
