#[macro_use]
extern crate serde;
#[macro_use]
extern crate log;

mod ballot;
mod ballot_box;
mod cipher;
mod config;
mod election;
mod error;
mod journal;
mod ledger;
mod receipt;
mod tally;

pub use ballot::*;
pub use ballot_box::*;
pub use cipher::*;
pub use config::*;
pub use election::*;
pub use error::*;
pub use ledger::*;
pub use receipt::*;
pub use tally::*;

#[cfg(test)]
mod tests;
