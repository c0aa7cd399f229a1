use super::*;

/// Return the master proteins of a protein-peptide graph: those proteins
/// whose peptide set is not a strict subset of another protein's set.
///
/// Proteins with identical peptide sets are tied, and only the
/// alphabetically first of a tied set is reported. It stays the master of
/// its group even when the group sort ranks another tied member first.
pub fn get_masters(graph: &ProteinPeptideGraph) -> BTreeSet<String> {
    let mut masters = BTreeSet::new();
    for (protein, peps) in graph {
        let mut is_master = true;
        let mut tied: BTreeSet<&str> = BTreeSet::new();
        for (other, other_peps) in graph {
            if protein == other || !peps.is_subset(other_peps) {
                continue;
            }
            if other_peps.len() > peps.len() {
                is_master = false;
                break;
            }
            tied.insert(protein.as_str());
            tied.insert(other.as_str());
        }
        if !is_master {
            continue;
        }
        // XXX: tied proteins other than the first are dropped here, even when
        // the group sort would rank one of them first
        match tied.iter().next() {
            Some(first) => masters.insert(first.to_string()),
            None => masters.insert(protein.clone()),
        };
    }
    masters
}
