//! Protein groups and PSM annotations produced by one grouping batch
use super::*;
#[cfg(feature = "serialization")]
use serde::Serialize;
use std::collections::BTreeMap;

/// Protein group columns for one PSM row
#[cfg_attr(feature = "serialization", derive(Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    /// Master accessions, `;` separated
    pub masters: String,
    /// Members of each master's group. Groups are `;` separated, members
    /// within a group `,` separated, in group order
    pub content: String,
    /// Number of the row's proteins found in each group, `;` separated
    pub hits: String,
}

#[cfg_attr(feature = "serialization", derive(Serialize))]
#[derive(Debug, Clone, Default, PartialEq)]
/// Container for the protein groups of a PSM table
pub struct Dataset {
    /// Sorted protein group of each master protein
    pub groups: BTreeMap<String, Vec<GroupMember>>,
    /// Number of peptides of each master not shared outside of its group
    pub unique_peptides: BTreeMap<String, usize>,
    /// (row index, master) pairs, ordered by row
    pub psm_masters: Vec<(usize, String)>,
    /// Annotations of the rows that have at least one master
    pub annotations: BTreeMap<usize, Annotation>,
}

impl Dataset {
    /// Master accessions, in alphabetical order
    pub fn masters(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Sorted group anchored by `master`
    pub fn group(&self, master: &str) -> Option<&[GroupMember]> {
        self.groups.get(master).map(Vec::as_slice)
    }

    /// Masters recorded for a PSM row
    pub fn masters_for_row(&self, row: usize) -> Vec<&str> {
        let start = self.psm_masters.partition_point(|(r, _)| *r < row);
        self.psm_masters[start..]
            .iter()
            .take_while(|(r, _)| *r == row)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    /// Build the protein group columns of a row matching `proteins`.
    ///
    /// Returns `None` for rows without a master, e.g. filtered rows
    pub fn annotate(&self, row: usize, proteins: &[&str]) -> Option<Annotation> {
        let masters = self.masters_for_row(row);
        if masters.is_empty() {
            return None;
        }
        let groups = masters
            .iter()
            .map(|m| self.group(m).unwrap_or(&[]))
            .collect::<Vec<_>>();

        let content = groups
            .iter()
            .map(|g| {
                g.iter()
                    .map(|m| m.protein.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join(";");
        let hits = groups
            .iter()
            .map(|g| {
                proteins
                    .iter()
                    .filter(|p| g.iter().any(|m| m.protein == **p))
                    .count()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(";");

        Some(Annotation {
            masters: masters.join(";"),
            content,
            hits,
        })
    }
}
