//! Protein grouping by peptide evidence
//!
//! A protein is a *master* when no other protein's peptide set strictly
//! contains its own. Each master anchors a protein group: every protein
//! whose peptides are all found among the master's peptides. Groups are
//! ordered by peptide count, PSM count and summed score, with the accession
//! as the final tie breaker.
use super::*;
use std::collections::{BTreeMap, BTreeSet};

mod content;
mod masters;
mod sort;

pub use content::{build_group, count_unique_peptides};
pub use masters::get_masters;
pub use sort::{sort_by_keys, sort_group, SortKey, SORT_ORDER};

/// Protein accession -> set of peptide sequences matched by the protein
pub type ProteinPeptideGraph = BTreeMap<String, BTreeSet<String>>;

/// One protein of a protein group, with the evidence it has within the group
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupMember {
    pub protein: String,
    pub master: String,
    /// Number of distinct peptide sequences
    pub peptide_count: usize,
    /// Number of distinct PSMs
    pub psm_count: usize,
    /// Sum of the integer scores of the PSMs
    pub score: i64,
}

impl GroupMember {
    /// Member row with no evidence, used for masters without recorded peptides
    pub fn empty(protein: &str, master: &str) -> GroupMember {
        GroupMember {
            protein: protein.into(),
            master: master.into(),
            peptide_count: 0,
            psm_count: 0,
            score: 0,
        }
    }
}
