//! Two-phase protein grouping of one PSM table.
//!
//! Phase one resolves the masters of every PSM row passing the filters and
//! persists them. Only once all rows have contributed does phase two build,
//! sort and persist the content of each master's group, since a protein can
//! only be confirmed as a master after the whole batch is seen.
use super::*;

use log::{debug, info, warn};
use rusqlite::Connection;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Master proteins collected over a batch of PSMs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterIndex {
    pub masters: BTreeSet<String>,
    /// (row index, master) pairs, ordered by row
    pub psm_masters: Vec<(usize, String)>,
}

/// Proteins a row speaks for. Unrolled tables hold one protein per line, so
/// the full list is read back from the store
fn row_proteins<S: ProteinStore>(psm: &Psm, unroll: bool, store: &S) -> Result<Vec<String>, Error> {
    if unroll {
        store.get_proteins_for_psm(&psm.psm_id)
    } else {
        Ok(psm.proteins.iter().map(|p| p.to_string()).collect())
    }
}

/// Phase one: resolve and persist the masters of every row passing `filter`
pub fn collect_masters<S: ProteinStore>(
    psms: &[Psm],
    filter: &Filter,
    unroll: bool,
    store: &S,
) -> Result<MasterIndex, Error> {
    let time = Instant::now();
    let mut index = MasterIndex::default();
    for psm in psms {
        if !filter.passes(psm) {
            debug!("Row {} does not pass filters", psm.row);
            continue;
        }
        let proteins = row_proteins(psm, unroll, store)?;
        let proteins = proteins.iter().map(String::as_str).collect::<Vec<_>>();
        let graph = store.get_protpepmap_from_proteins(&proteins)?;
        for protein in &proteins {
            if !graph.contains_key(*protein) {
                warn!("No peptides recorded for protein {} on row {}", protein, psm.row);
            }
        }
        for master in get_masters(&graph) {
            index.psm_masters.push((psm.row, master.clone()));
            index.masters.insert(master);
        }
    }
    store.store_masters(&index.masters, &index.psm_masters)?;
    info!(
        "-  found {} master proteins for {} rows in {:?}ms",
        index.masters.len(),
        psms.len(),
        time.elapsed().as_millis()
    );
    Ok(index)
}

/// Phase two: build, sort and persist the group of every stored master, then
/// annotate the PSM rows
pub fn build_groups<S: ProteinStore>(
    psms: &[Psm],
    index: MasterIndex,
    unroll: bool,
    store: &S,
) -> Result<Dataset, Error> {
    let time = Instant::now();
    let mut groups = BTreeMap::new();
    let mut unique_peptides = BTreeMap::new();
    for master in store.get_all_masters()? {
        let group = sort_group(build_group(&master, store)?);
        store.store_protein_group_content(&group)?;
        unique_peptides.insert(master.clone(), count_unique_peptides(&master, &group, store)?);
        groups.insert(master, group);
    }
    info!(
        "-  built {} protein groups in {:?}ms",
        groups.len(),
        time.elapsed().as_millis()
    );

    let mut dataset = Dataset {
        groups,
        unique_peptides,
        psm_masters: index.psm_masters,
        annotations: BTreeMap::new(),
    };
    for psm in psms {
        if dataset.masters_for_row(psm.row).is_empty() {
            continue;
        }
        let proteins = row_proteins(psm, unroll, store)?;
        let proteins = proteins.iter().map(String::as_str).collect::<Vec<_>>();
        if let Some(annotation) = dataset.annotate(psm.row, &proteins) {
            dataset.annotations.insert(psm.row, annotation);
        }
    }
    Ok(dataset)
}

/// Run both phases against an already loaded store
pub fn group_proteins<S: ProteinStore>(
    psms: &[Psm],
    filter: &Filter,
    unroll: bool,
    store: &S,
) -> Result<Dataset, Error> {
    let index = collect_masters(psms, filter, unroll, store)?;
    build_groups(psms, index, unroll, store)
}

/// Load the PSMs passing `filter` into SQLite and group their proteins.
///
/// The whole batch runs in one transaction, which is rolled back if any
/// step fails
pub fn run_batch(
    conn: &mut Connection,
    psms: &[Psm],
    filter: &Filter,
    unroll: bool,
) -> Result<Dataset, Error> {
    // has no effect inside a transaction
    conn.pragma_update(None, "foreign_keys", true)?;
    let tx = conn.transaction()?;
    SqliteStore::create_tables(&tx)?;
    SqliteStore::clear_tables(&tx)?;
    let dataset = {
        let store = SqliteStore::new(&tx);
        let stored = store.store_psms(psms.iter().filter(|psm| filter.passes(psm)))?;
        info!("Grouping proteins of {} of {} PSM rows", stored, psms.len());
        group_proteins(psms, filter, unroll, &store)?
    };
    tx.commit()?;
    Ok(dataset)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::test::{fixture, memory_store};

    fn row(row: usize, id: &'static str, peptide: &'static str, score: i64, proteins: &[&'static str]) -> Psm<'static> {
        Psm {
            row,
            confidence: Some(0.001),
            ..fixture(id, peptide, score, proteins)
        }
    }

    #[test_log::test]
    fn two_phase() {
        let psms = vec![
            row(0, "s1", "pepA", 10, &["P1", "P2"]),
            row(1, "s2", "pepB", 20, &["P1"]),
            row(2, "s3", "pepC", 5, &["P3", "P4"]),
            Psm {
                confidence: Some(0.5),
                ..row(3, "s4", "pepD", 50, &["P5"])
            },
        ];
        let filter = Filter::default().add_psm_filter(PsmFilter::Confidence {
            threshold: 0.01,
            direction: ScoreDirection::Lower,
        });
        let mut conn = Connection::open_in_memory().unwrap();
        let d = run_batch(&mut conn, &psms, &filter, false).unwrap();

        assert_eq!(d.masters().collect::<Vec<_>>(), vec!["P1", "P3"]);
        assert_eq!(
            d.psm_masters,
            vec![(0, "P1".to_string()), (1, "P1".to_string()), (2, "P3".to_string())]
        );
        let p1 = d.group("P1").unwrap();
        assert_eq!(p1.len(), 2);
        assert_eq!((p1[0].protein.as_str(), p1[0].peptide_count, p1[0].score), ("P1", 2, 30));
        assert_eq!((p1[1].protein.as_str(), p1[1].psm_count, p1[1].score), ("P2", 1, 10));

        let p3 = d.group("P3").unwrap();
        assert_eq!(p3.iter().map(|m| m.protein.as_str()).collect::<Vec<_>>(), vec!["P3", "P4"]);

        assert_eq!(d.unique_peptides["P1"], 2);
        assert_eq!(d.unique_peptides["P3"], 1);
        assert_eq!(d.annotations[&0].content, "P1,P2");
        assert_eq!(d.annotations[&0].hits, "2");
        assert_eq!(d.annotations[&2].masters, "P3");
        assert!(!d.annotations.contains_key(&3));

        // committed: the content is readable after the batch
        let store = SqliteStore::new(&conn);
        assert_eq!(store.get_protein_group_content("P1").unwrap(), p1.to_vec());
        assert!(store.get_peptides_from_protein("P5").unwrap().is_empty());
    }

    #[test]
    fn unrolled_rows() {
        let conn = memory_store();
        let store = SqliteStore::new(&conn);
        let psms = vec![
            row(0, "s1", "pepA", 3, &["P2"]),
            row(1, "s1", "pepA", 3, &["P1"]),
            row(2, "s2", "pepB", 4, &["P1"]),
        ];
        store.store_psms(&psms).unwrap();
        let d = group_proteins(&psms, &Filter::default(), true, &store).unwrap();
        assert_eq!(d.masters_for_row(0), vec!["P1"]);
        assert_eq!(d.masters_for_row(1), vec!["P1"]);
        assert_eq!(d.annotations[&0].hits, "2");
        assert_eq!(d.group("P1").unwrap()[0].psm_count, 2);
    }

    #[test]
    fn failed_batch_rolls_back() {
        let mut conn = Connection::open_in_memory().unwrap();
        SqliteStore::create_tables(&conn).unwrap();
        // content table without the rank column: phase two fails to insert
        conn.execute_batch(
            "DROP TABLE protein_group_content;
             CREATE TABLE protein_group_content(protein_acc TEXT, master_id INTEGER);",
        )
        .unwrap();
        let psms = vec![row(0, "s1", "pepA", 1, &["P1"])];
        let res = run_batch(&mut conn, &psms, &Filter::default(), false);
        assert!(matches!(res, Err(Error::Storage(_))));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM psms", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn batches_share_a_database_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut conn = Connection::open(file.path()).unwrap();

        let first = vec![row(0, "s1", "pepA", 5, &["OLD"])];
        let d = run_batch(&mut conn, &first, &Filter::default(), false).unwrap();
        assert_eq!(d.masters().collect::<Vec<_>>(), vec!["OLD"]);

        let second = vec![row(0, "s2", "pepB", 7, &["NEW"])];
        let d = run_batch(&mut conn, &second, &Filter::default(), false).unwrap();
        assert_eq!(d.masters().collect::<Vec<_>>(), vec!["NEW"]);

        let store = SqliteStore::new(&conn);
        assert_eq!(store.get_all_masters().unwrap(), vec!["NEW"]);
        assert!(store.get_protein_group_content("OLD").unwrap().is_empty());
        assert_eq!(store.get_protein_group_content("NEW").unwrap().len(), 1);
        assert_eq!(count(&conn, "psms"), 1);
        assert_eq!(count(&conn, "psm_protein_groups"), 1);
    }

    #[test]
    fn foreign_keys_enforced() {
        let mut conn = Connection::open_in_memory().unwrap();
        let psms = vec![row(0, "s1", "pepA", 1, &["P1"])];
        run_batch(&mut conn, &psms, &Filter::default(), false).unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |r| r.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
        assert!(conn
            .execute("INSERT INTO protein_psm(protein_acc, psm_id) VALUES ('P9', 'missing')", [])
            .is_err());
    }
}
