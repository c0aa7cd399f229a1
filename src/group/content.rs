use super::*;
use log::warn;

#[derive(Default)]
struct Evidence<'a> {
    peptides: BTreeSet<&'a str>,
    psms: BTreeSet<&'a str>,
    score: i64,
}

/// Build the content of the protein group anchored by `master`.
///
/// Every protein sharing a peptide with the master is a candidate, and
/// candidates with any peptide outside the master's peptide set are dropped.
/// The master itself is always part of its group. Rows are returned in
/// accession order; use [`sort_group`] to rank them.
pub fn build_group<S: ProteinStore>(master: &str, store: &S) -> Result<Vec<GroupMember>, Error> {
    let peptides = store.get_peptides_from_protein(master)?;
    if peptides.is_empty() {
        warn!("Master protein {} has no recorded peptides", master);
        return Ok(vec![GroupMember::empty(master, master)]);
    }

    let matches = store.get_proteins_peptides_from_psms(&peptides)?;
    let candidates = matches
        .iter()
        .map(|m| m.protein.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    let excluded = store.filter_proteins_with_missing_peptides(&candidates, &peptides)?;

    let mut evidence: BTreeMap<&str, Evidence> = BTreeMap::new();
    for m in matches.iter().filter(|m| !excluded.contains(&m.protein)) {
        let ev = evidence.entry(m.protein.as_str()).or_default();
        ev.peptides.insert(m.peptide.as_str());
        ev.psms.insert(m.psm_id.as_str());
        ev.score += m.score;
    }

    let mut group = evidence
        .into_iter()
        .map(|(protein, ev)| GroupMember {
            protein: protein.into(),
            master: master.into(),
            peptide_count: ev.peptides.len(),
            psm_count: ev.psms.len(),
            score: ev.score,
        })
        .collect::<Vec<_>>();

    if !group.iter().any(|m| m.protein == master) {
        warn!("Protein group of {} does not contain its master", master);
        group.push(GroupMember::empty(master, master));
    }
    Ok(group)
}

/// Number of the master's peptides whose PSMs match no protein outside of
/// its group
pub fn count_unique_peptides<S: ProteinStore>(
    master: &str,
    group: &[GroupMember],
    store: &S,
) -> Result<usize, Error> {
    let peptides = store.get_peptides_from_protein(master)?;
    if peptides.is_empty() {
        return Ok(0);
    }
    let members = group.iter().map(|m| m.protein.as_str()).collect::<BTreeSet<_>>();
    let shared = store
        .get_proteins_peptides_from_psms(&peptides)?
        .into_iter()
        .filter(|m| !members.contains(m.protein.as_str()))
        .map(|m| m.peptide)
        .collect::<BTreeSet<_>>();
    Ok(peptides.difference(&shared).count())
}
