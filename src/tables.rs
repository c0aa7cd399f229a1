//! Rows of the protein and peptide summary tables
use super::*;
use std::collections::{HashMap, HashSet};

/// One protein group, summarized by its master
#[derive(Debug, Clone, PartialEq)]
pub struct ProteinRow<'d> {
    pub master: &'d str,
    /// Group members in sorted order
    pub members: Vec<&'d str>,
    pub unique_peptides: usize,
    pub peptide_count: usize,
    pub psm_count: usize,
    pub score: i64,
}

/// Summarize every protein group of a dataset, in master order.
///
/// Counts and score are those of the master's own row in its group
pub fn protein_table(dataset: &Dataset) -> Vec<ProteinRow<'_>> {
    dataset
        .groups
        .iter()
        .map(|(master, group)| {
            let own = group.iter().find(|m| &m.protein == master);
            ProteinRow {
                master: master.as_str(),
                members: group.iter().map(|m| m.protein.as_str()).collect(),
                unique_peptides: dataset.unique_peptides.get(master).copied().unwrap_or(0),
                peptide_count: own.map(|m| m.peptide_count).unwrap_or(0),
                psm_count: own.map(|m| m.psm_count).unwrap_or(0),
                score: own.map(|m| m.score).unwrap_or(0),
            }
        })
        .collect()
}

/// Best scoring PSM of a peptide sequence
#[derive(Debug, Clone, PartialEq)]
pub struct PeptideRow<'a, 's> {
    pub psm: &'a Psm<'s>,
    /// Number of distinct PSMs of the peptide
    pub psm_count: usize,
}

/// Collapse PSMs passing `filter` into one row per peptide sequence, in
/// order of first appearance. The highest scoring PSM represents the
/// peptide; the first one seen wins ties
pub fn peptide_table<'a, 's>(psms: &'a [Psm<'s>], filter: &Filter) -> Vec<PeptideRow<'a, 's>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut rows: Vec<PeptideRow> = Vec::new();

    for psm in psms.iter().filter(|psm| filter.passes(psm)) {
        let new_psm = seen.insert((psm.peptide, psm.psm_id.as_str()));
        match index.get(psm.peptide) {
            Some(&ix) => {
                let row = &mut rows[ix];
                if new_psm {
                    row.psm_count += 1;
                }
                if psm.score > row.psm.score {
                    row.psm = psm;
                }
            }
            None => {
                index.insert(psm.peptide, rows.len());
                rows.push(PeptideRow { psm, psm_count: 1 });
            }
        }
    }
    rows
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::test::fixture;
    use std::collections::BTreeMap;

    #[test]
    fn best_psm_per_peptide() {
        let psms = vec![
            fixture("s1", "AAK", 5, &["P1"]),
            fixture("s2", "CCK", 9, &["P2"]),
            fixture("s3", "AAK", 8, &["P1"]),
            fixture("s4", "AAK", 8, &["P1"]),
            // unrolled line of s3
            fixture("s3", "AAK", 8, &["P9"]),
            fixture("s5", "DDK", 99, &["DECOY_P3"]),
        ];
        let filter = Filter::default().add_psm_filter(PsmFilter::ExcludeProtein("DECOY_".into()));
        let rows = peptide_table(&psms, &filter);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].psm.peptide, "AAK");
        assert_eq!(rows[0].psm.psm_id, "s3");
        assert_eq!(rows[0].psm_count, 3);
        assert_eq!((rows[1].psm.peptide, rows[1].psm_count), ("CCK", 1));
    }

    #[test]
    fn protein_rows() {
        let mut groups = BTreeMap::new();
        groups.insert(
            "M".to_string(),
            vec![
                GroupMember {
                    protein: "S".into(),
                    master: "M".into(),
                    peptide_count: 3,
                    psm_count: 4,
                    score: 50,
                },
                GroupMember {
                    protein: "M".into(),
                    master: "M".into(),
                    peptide_count: 2,
                    psm_count: 3,
                    score: 22,
                },
            ],
        );
        let mut unique_peptides = BTreeMap::new();
        unique_peptides.insert("M".to_string(), 1);
        let dataset = Dataset {
            groups,
            unique_peptides,
            ..Dataset::default()
        };
        let rows = protein_table(&dataset);
        assert_eq!(
            rows,
            vec![ProteinRow {
                master: "M",
                members: vec!["S", "M"],
                unique_peptides: 1,
                peptide_count: 2,
                psm_count: 3,
                score: 22,
            }]
        );
    }
}
