use super::*;

/// Keys used to rank the members of a protein group
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Peptide count, descending
    Peptides,
    /// PSM count, descending
    Psms,
    /// Summed score, descending
    Score,
    /// Sequence coverage. Not tracked per member, so it keeps ties together
    Coverage,
    /// Accession, ascending. Always splits every tie
    Accession,
}

/// Cascade of keys applied by [`sort_group`]
pub const SORT_ORDER: [SortKey; 5] = [
    SortKey::Peptides,
    SortKey::Psms,
    SortKey::Score,
    SortKey::Coverage,
    SortKey::Accession,
];

impl SortKey {
    /// Split members into ordered partitions of equal key value
    fn partition(self, members: Vec<GroupMember>) -> Vec<Vec<GroupMember>> {
        match self {
            SortKey::Peptides => partition_descending(members, |m| m.peptide_count as i64),
            SortKey::Psms => partition_descending(members, |m| m.psm_count as i64),
            SortKey::Score => partition_descending(members, |m| m.score),
            SortKey::Coverage => vec![members],
            SortKey::Accession => {
                let mut members = members;
                members.sort_by(|a, b| a.protein.cmp(&b.protein));
                vec![members]
            }
        }
    }
}

/// Partition by an integer amount, largest amount first. Members keep their
/// relative order within a partition
fn partition_descending<F>(members: Vec<GroupMember>, amount: F) -> Vec<Vec<GroupMember>>
where
    F: Fn(&GroupMember) -> i64,
{
    let mut amounts: BTreeMap<i64, Vec<GroupMember>> = BTreeMap::new();
    for m in members {
        amounts.entry(amount(&m)).or_default().push(m);
    }
    amounts.into_iter().rev().map(|(_, v)| v).collect()
}

/// Recursively order members: partition by the first key, then order every
/// partition holding more than one member by the remaining keys
pub fn sort_by_keys(members: Vec<GroupMember>, keys: &[SortKey]) -> Vec<GroupMember> {
    let (key, rest) = match keys.split_first() {
        Some(split) => split,
        None => return members,
    };
    let mut sorted = Vec::with_capacity(members.len());
    for part in key.partition(members) {
        if part.len() > 1 && !rest.is_empty() {
            sorted.extend(sort_by_keys(part, rest));
        } else {
            sorted.extend(part);
        }
    }
    sorted
}

/// Order a protein group by [`SORT_ORDER`]
pub fn sort_group(members: Vec<GroupMember>) -> Vec<GroupMember> {
    sort_by_keys(members, &SORT_ORDER)
}

#[cfg(test)]
mod test {
    use super::*;

    fn member(protein: &str, peps: usize, psms: usize, score: i64) -> GroupMember {
        GroupMember {
            protein: protein.into(),
            master: "M".into(),
            peptide_count: peps,
            psm_count: psms,
            score,
        }
    }

    fn accessions(group: &[GroupMember]) -> Vec<&str> {
        group.iter().map(|m| m.protein.as_str()).collect()
    }

    #[test]
    fn score_breaks_count_ties() {
        let group = vec![
            member("Px", 2, 5, 10),
            member("Py", 2, 5, 20),
            member("Pz", 1, 1, 1),
        ];
        assert_eq!(accessions(&sort_group(group)), vec!["Py", "Px", "Pz"]);
    }

    #[test]
    fn cascade() {
        let group = vec![
            member("D", 1, 9, 90),
            member("C", 3, 1, 1),
            member("B", 3, 2, 0),
            member("A", 3, 2, 0),
            member("E", 3, 2, 5),
        ];
        assert_eq!(accessions(&sort_group(group)), vec!["E", "A", "B", "C", "D"]);
    }

    #[test]
    fn idempotent_and_total() {
        let group = vec![
            member("Q3", 2, 2, 2),
            member("Q1", 2, 2, 2),
            member("Q2", 2, 2, 2),
            member("Q0", 1, 2, 2),
        ];
        let once = sort_group(group.clone());
        assert_eq!(accessions(&once), vec!["Q1", "Q2", "Q3", "Q0"]);
        assert_eq!(sort_group(once.clone()), once);

        let mut reversed = group;
        reversed.reverse();
        assert_eq!(sort_group(reversed), once);
    }

    #[test]
    fn partial_cascade_keeps_order() {
        let group = vec![member("B", 1, 1, 1), member("A", 1, 1, 1)];
        let sorted = sort_by_keys(group, &[SortKey::Peptides, SortKey::Coverage]);
        assert_eq!(accessions(&sorted), vec!["B", "A"]);
        assert!(sort_by_keys(Vec::new(), &SORT_ORDER).is_empty());
    }
}
