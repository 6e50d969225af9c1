use ballotbox::{BallotBox, Config};
use clap::{App, Arg, SubCommand};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::str::FromStr;

mod command_election;
mod command_keygen;
mod command_receipts;
mod command_tally;
mod command_vote;

fn main() {
    dotenvy::dotenv().ok();
    init_logging();

    let matches = App::new("ballotbox")
        .version("0.1.0")
        .about("Confidential ballot box with public vote receipts")
        .subcommand(
            SubCommand::with_name("keygen")
                .about("Generate a fresh 32-byte encryption key, hex encoded"),
        )
        .subcommand(
            SubCommand::with_name("election")
                .about("Create and manage elections")
                .subcommand(
                    SubCommand::with_name("create")
                        .about("Create a new election, open for voting")
                        .arg(
                            Arg::with_name("NAME")
                                .index(1)
                                .required(true)
                                .help("Display name of the election"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("open")
                        .about("Open an election for voting")
                        .arg(Arg::with_name("ELECTION-ID").index(1).required(true)),
                )
                .subcommand(
                    SubCommand::with_name("close")
                        .about("Close an election")
                        .arg(Arg::with_name("ELECTION-ID").index(1).required(true)),
                )
                .subcommand(
                    SubCommand::with_name("show")
                        .about("Show an election and its candidates")
                        .arg(Arg::with_name("ELECTION-ID").index(1).required(true)),
                )
                .subcommand(SubCommand::with_name("list").about("List all elections")),
        )
        .subcommand(
            SubCommand::with_name("candidate")
                .about("Manage candidates")
                .subcommand(
                    SubCommand::with_name("add")
                        .about("Add a candidate to an election")
                        .arg(Arg::with_name("ELECTION-ID").index(1).required(true))
                        .arg(
                            Arg::with_name("NAME")
                                .index(2)
                                .required(true)
                                .help("Display name of the candidate"),
                        ),
                ),
        )
        .subcommand(
            SubCommand::with_name("vote")
                .about("Cast votes and inspect receipts")
                .subcommand(
                    SubCommand::with_name("cast")
                        .about("Cast a vote")
                        .arg(Arg::with_name("ELECTION-ID").index(1).required(true))
                        .arg(Arg::with_name("CANDIDATE-ID").index(2).required(true))
                        .arg(
                            Arg::with_name("voter")
                                .long("voter")
                                .takes_value(true)
                                .required(true)
                                .help("Stable voter identity"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("receipt")
                        .about("Fetch the receipt for a previously cast vote")
                        .arg(Arg::with_name("VOTE-ID").index(1).required(true))
                        .arg(
                            Arg::with_name("voter")
                                .long("voter")
                                .takes_value(true)
                                .required(true)
                                .help("Stable voter identity"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("verify")
                        .about("Check a receipt hash against the public ledger")
                        .arg(Arg::with_name("RECEIPT-HASH").index(1).required(true)),
                ),
        )
        .subcommand(
            SubCommand::with_name("receipts")
                .about("Print the public receipt ledger as a JSON array"),
        )
        .subcommand(
            SubCommand::with_name("tally")
                .about("Print aggregate counts for an election")
                .arg(Arg::with_name("ELECTION-ID").index(1).required(true)),
        )
        .get_matches();

    // keygen runs before any configuration exists, so it must not need the key.
    if matches.subcommand_matches("keygen").is_some() {
        command_keygen::run();
        return;
    }

    let ballot_box = open_ballot_box();

    if let Some(matches) = matches.subcommand_matches("election") {
        command_election::run(matches, &ballot_box);
    } else if let Some(matches) = matches.subcommand_matches("candidate") {
        command_election::run_candidate(matches, &ballot_box);
    } else if let Some(matches) = matches.subcommand_matches("vote") {
        command_vote::run(matches, &ballot_box);
    } else if matches.subcommand_matches("receipts").is_some() {
        command_receipts::run(&ballot_box);
    } else if let Some(matches) = matches.subcommand_matches("tally") {
        command_tally::run(matches, &ballot_box);
    } else {
        eprintln!("ballotbox: no command given, try --help");
        std::process::exit(1);
    }
}

fn open_ballot_box() -> BallotBox {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    match BallotBox::open(&config) {
        Ok(ballot_box) => ballot_box,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

pub fn unwrap_or_exit<T>(result: Result<T, ballotbox::Error>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let level = std::env::var("BALLOTBOX_LOG")
        .ok()
        .and_then(|level| LevelFilter::from_str(&level).ok())
        .unwrap_or(LevelFilter::Warn);

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();

    let config = LogConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .expect("ballotbox: bad logging configuration");
    log4rs::init_config(config).expect("ballotbox: logging already initialized");
}
