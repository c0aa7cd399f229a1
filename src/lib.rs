//! A Rust library for resolving protein groups from tab-separated
//! peptide-spectrum match (PSM) tables.
//!
//! Proteins matched by a PSM are reduced to their *master* proteins, those
//! not subsumed by another protein's peptide evidence. Once a whole batch of
//! PSMs has been seen, every master's group content is built, ranked and
//! persisted to SQLite, and each PSM row is annotated with its groups.
//!
//! ```no_run
//! use stitch_proteomics::{read_psms, run_batch, Config};
//!
//! # fn main() -> Result<(), stitch_proteomics::Error> {
//! let config = Config::default();
//! let input = std::fs::read_to_string("psms.txt")?;
//! let psms = read_psms(&input, &config)?;
//! let mut conn = rusqlite::Connection::open_in_memory()?;
//! let dataset = run_batch(&mut conn, &psms, &config.filter()?, config.unroll)?;
//! for master in dataset.masters() {
//!     println!("{}: {:?}", master, dataset.group(master));
//! }
//! # Ok(())
//! # }
//! ```
mod batch;
mod config;
mod dataset;
mod error;
mod filter;
mod group;
mod parser;
mod psm;
mod store;
pub mod tables;
pub mod writer;

pub use batch::{build_groups, collect_masters, group_proteins, run_batch, MasterIndex};
pub use config::Config;
pub use dataset::{Annotation, Dataset};
pub use error::Error;
pub use filter::{Filter, PsmFilter};
pub use group::{
    build_group, count_unique_peptides, get_masters, sort_by_keys, sort_group, GroupMember,
    ProteinPeptideGraph, SortKey, SORT_ORDER,
};
pub use parser::{find_column, Error as ParseError, ErrorKind, Header, Parser};
pub use psm::{split_proteins, Psm, ScoreDirection};
pub use store::{ProteinMatch, ProteinStore, SqliteStore};

/// Parse the full text of a PSM table into its rows
pub fn read_psms<'s>(input: &'s str, config: &Config) -> Result<Vec<Psm<'s>>, Error> {
    let psms = Parser::new(input, config)?.collect::<Result<Vec<_>, _>>()?;
    Ok(psms)
}
