//! Relational storage of PSMs, protein matches and protein groups
use super::*;

use log::debug;
use rusqlite::{params, params_from_iter, Connection, Row, ToSql};
use std::collections::BTreeSet;

/// Upper bound on host parameters bound in one `IN (...)` query
const MAX_PARAMS: usize = 500;

/// A protein matched by a PSM, as stored
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProteinMatch {
    pub protein: String,
    pub peptide: String,
    pub score: i64,
    pub psm_id: String,
}

/// Persisted relations consumed by the grouping engine
pub trait ProteinStore {
    /// Record PSMs and the proteins they match, returning the number of
    /// PSM lines seen
    fn store_psms<'a, 's: 'a, I>(&self, psms: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = &'a Psm<'s>>;

    /// All proteins recorded for a PSM, for unrolled tables
    fn get_proteins_for_psm(&self, psm_id: &str) -> Result<Vec<String>, Error>;

    /// Peptides of each given protein, over the whole run. Proteins without
    /// any recorded peptide are absent from the result
    fn get_protpepmap_from_proteins(&self, proteins: &[&str]) -> Result<ProteinPeptideGraph, Error>;

    /// Record the masters of a batch, and which PSM rows each was found for
    fn store_masters(
        &self,
        masters: &BTreeSet<String>,
        psm_masters: &[(usize, String)],
    ) -> Result<(), Error>;

    fn get_all_masters(&self) -> Result<Vec<String>, Error>;

    fn get_peptides_from_protein(&self, protein: &str) -> Result<BTreeSet<String>, Error>;

    /// Every protein match of PSMs carrying one of the given peptides
    fn get_proteins_peptides_from_psms(
        &self,
        peptides: &BTreeSet<String>,
    ) -> Result<Vec<ProteinMatch>, Error>;

    /// Those of `proteins` that have a peptide outside of `peptides`
    fn filter_proteins_with_missing_peptides(
        &self,
        proteins: &[&str],
        peptides: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, Error>;

    /// Record sorted group content. Rows keep their order when read back
    fn store_protein_group_content(&self, rows: &[GroupMember]) -> Result<(), Error>;

    /// Sorted content of the group anchored by `master`
    fn get_protein_group_content(&self, master: &str) -> Result<Vec<GroupMember>, Error>;
}

trait FromSQL: Sized {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error>;

    fn get_sql() -> String;

    fn read_from_where<I: rusqlite::Params>(
        connection: &Connection,
        params: I,
        condition_sql_fragment: &str,
    ) -> Result<Vec<Self>, rusqlite::Error> {
        let sql = Self::get_sql();
        let sql = format!("{sql} WHERE {condition_sql_fragment}");
        let mut stmt = connection.prepare(&sql)?;
        let out: Result<Vec<Self>, rusqlite::Error> = stmt
            .query_map(params, |row: &Row<'_>| Self::from_row(row))?
            .collect();
        out
    }
}

impl FromSQL for ProteinMatch {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(ProteinMatch {
            protein: row.get(0)?,
            peptide: row.get(1)?,
            score: row.get(2)?,
            psm_id: row.get(3)?,
        })
    }

    fn get_sql() -> String {
        "SELECT pp.protein_acc, p.sequence, p.score, p.psm_id FROM protein_psm AS pp JOIN psms AS p USING(psm_id)".into()
    }
}

impl FromSQL for GroupMember {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(GroupMember {
            protein: row.get(0)?,
            master: row.get(1)?,
            peptide_count: row.get::<_, i64>(2)? as usize,
            psm_count: row.get::<_, i64>(3)? as usize,
            score: row.get(4)?,
        })
    }

    fn get_sql() -> String {
        "SELECT pgc.protein_acc, pgm.protein_acc, pgc.peptide_count, pgc.psm_count, pgc.protein_score \
         FROM protein_group_content AS pgc JOIN protein_group_master AS pgm USING(master_id)"
            .into()
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// `ProteinStore` backed by SQLite. Borrowing the connection lets the
/// caller scope a whole batch to one transaction
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> SqliteStore<'c> {
        SqliteStore { conn }
    }

    /// Create tables and indices, if they don't exist yet
    pub fn create_tables(conn: &Connection) -> Result<(), Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS psms(
                psm_id TEXT PRIMARY KEY NOT NULL,
                sequence TEXT NOT NULL,
                score INTEGER NOT NULL);
            CREATE TABLE IF NOT EXISTS protein_psm(
                protein_acc TEXT NOT NULL,
                psm_id TEXT NOT NULL REFERENCES psms(psm_id),
                UNIQUE(protein_acc, psm_id));
            CREATE TABLE IF NOT EXISTS protein_group_master(
                master_id INTEGER PRIMARY KEY,
                protein_acc TEXT UNIQUE NOT NULL);
            CREATE TABLE IF NOT EXISTS psm_protein_groups(
                psm_row INTEGER NOT NULL,
                master_id INTEGER NOT NULL REFERENCES protein_group_master(master_id));
            CREATE TABLE IF NOT EXISTS protein_group_content(
                protein_acc TEXT NOT NULL,
                master_id INTEGER NOT NULL REFERENCES protein_group_master(master_id),
                rank INTEGER NOT NULL,
                peptide_count INTEGER NOT NULL,
                psm_count INTEGER NOT NULL,
                protein_score INTEGER NOT NULL);
            CREATE INDEX IF NOT EXISTS psms_seq_index ON psms(sequence);
            CREATE INDEX IF NOT EXISTS protein_psm_acc_index ON protein_psm(protein_acc);
            CREATE INDEX IF NOT EXISTS protein_psm_id_index ON protein_psm(psm_id);
            CREATE INDEX IF NOT EXISTS pgc_master_index ON protein_group_content(master_id);",
        )?;
        Ok(())
    }

    /// Remove all rows left by a previous batch. Tables are emptied in
    /// reference order
    pub fn clear_tables(conn: &Connection) -> Result<(), Error> {
        conn.execute_batch(
            "DELETE FROM protein_group_content;
            DELETE FROM psm_protein_groups;
            DELETE FROM protein_group_master;
            DELETE FROM protein_psm;
            DELETE FROM psms;",
        )?;
        Ok(())
    }

    /// Run a query once per chunk of `values`, bound to the `IN (...)` list
    /// produced by `sql`
    fn chunked<V, F, M>(&self, values: &[V], query: F, mut map: M) -> Result<(), Error>
    where
        V: ToSql,
        F: Fn(&str) -> String,
        M: FnMut(&Row<'_>) -> Result<(), rusqlite::Error>,
    {
        for chunk in values.chunks(MAX_PARAMS) {
            let sql = query(&placeholders(chunk.len()));
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
            while let Some(row) = rows.next()? {
                map(row)?;
            }
        }
        Ok(())
    }
}

impl<'c> ProteinStore for SqliteStore<'c> {
    fn store_psms<'a, 's: 'a, I>(&self, psms: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = &'a Psm<'s>>,
    {
        let mut insert_psm = self
            .conn
            .prepare("INSERT OR IGNORE INTO psms(psm_id, sequence, score) VALUES (?1, ?2, ?3)")?;
        let mut insert_protein = self
            .conn
            .prepare("INSERT OR IGNORE INTO protein_psm(protein_acc, psm_id) VALUES (?1, ?2)")?;
        let mut lines = 0;
        for psm in psms {
            insert_psm.execute(params![psm.psm_id, psm.peptide, psm.score])?;
            for protein in &psm.proteins {
                insert_protein.execute(params![protein, psm.psm_id])?;
            }
            lines += 1;
        }
        debug!("Stored {} PSM lines", lines);
        Ok(lines)
    }

    fn get_proteins_for_psm(&self, psm_id: &str) -> Result<Vec<String>, Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT protein_acc FROM protein_psm WHERE psm_id = ?1 ORDER BY protein_acc")?;
        let proteins: Result<Vec<String>, rusqlite::Error> =
            stmt.query_map([psm_id], |row| row.get(0))?.collect();
        Ok(proteins?)
    }

    fn get_protpepmap_from_proteins(&self, proteins: &[&str]) -> Result<ProteinPeptideGraph, Error> {
        let mut graph = ProteinPeptideGraph::new();
        self.chunked(
            proteins,
            |list| {
                format!(
                    "SELECT pp.protein_acc, p.sequence FROM protein_psm AS pp \
                     JOIN psms AS p USING(psm_id) WHERE pp.protein_acc IN ({})",
                    list
                )
            },
            |row| {
                graph
                    .entry(row.get::<_, String>(0)?)
                    .or_default()
                    .insert(row.get(1)?);
                Ok(())
            },
        )?;
        Ok(graph)
    }

    fn store_masters(
        &self,
        masters: &BTreeSet<String>,
        psm_masters: &[(usize, String)],
    ) -> Result<(), Error> {
        let mut insert_master = self
            .conn
            .prepare("INSERT OR IGNORE INTO protein_group_master(protein_acc) VALUES (?1)")?;
        for master in masters {
            insert_master.execute([master])?;
        }
        let mut insert_row = self.conn.prepare(
            "INSERT INTO psm_protein_groups(psm_row, master_id) \
             SELECT ?1, master_id FROM protein_group_master WHERE protein_acc = ?2",
        )?;
        for (row, master) in psm_masters {
            insert_row.execute(params![*row as i64, master])?;
        }
        Ok(())
    }

    fn get_all_masters(&self) -> Result<Vec<String>, Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT protein_acc FROM protein_group_master ORDER BY protein_acc")?;
        let masters: Result<Vec<String>, rusqlite::Error> =
            stmt.query_map([], |row| row.get(0))?.collect();
        Ok(masters?)
    }

    fn get_peptides_from_protein(&self, protein: &str) -> Result<BTreeSet<String>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT p.sequence FROM protein_psm AS pp \
             JOIN psms AS p USING(psm_id) WHERE pp.protein_acc = ?1",
        )?;
        let peptides: Result<BTreeSet<String>, rusqlite::Error> =
            stmt.query_map([protein], |row| row.get(0))?.collect();
        Ok(peptides?)
    }

    fn get_proteins_peptides_from_psms(
        &self,
        peptides: &BTreeSet<String>,
    ) -> Result<Vec<ProteinMatch>, Error> {
        let peptides = peptides.iter().collect::<Vec<_>>();
        let mut matches = Vec::new();
        for chunk in peptides.chunks(MAX_PARAMS) {
            let condition = format!("p.sequence IN ({})", placeholders(chunk.len()));
            matches.extend(ProteinMatch::read_from_where(
                self.conn,
                params_from_iter(chunk.iter()),
                &condition,
            )?);
        }
        Ok(matches)
    }

    fn filter_proteins_with_missing_peptides(
        &self,
        proteins: &[&str],
        peptides: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, Error> {
        Ok(self
            .get_protpepmap_from_proteins(proteins)?
            .into_iter()
            .filter(|(_, peps)| !peps.is_subset(peptides))
            .map(|(protein, _)| protein)
            .collect())
    }

    fn store_protein_group_content(&self, rows: &[GroupMember]) -> Result<(), Error> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO protein_group_content(protein_acc, master_id, rank, peptide_count, psm_count, protein_score) \
             SELECT ?1, master_id, ?2, ?3, ?4, ?5 FROM protein_group_master WHERE protein_acc = ?6",
        )?;
        for (rank, row) in rows.iter().enumerate() {
            stmt.execute(params![
                row.protein,
                rank as i64,
                row.peptide_count as i64,
                row.psm_count as i64,
                row.score,
                row.master,
            ])?;
        }
        Ok(())
    }

    fn get_protein_group_content(&self, master: &str) -> Result<Vec<GroupMember>, Error> {
        Ok(GroupMember::read_from_where(
            self.conn,
            [master],
            "pgm.protein_acc = ?1 ORDER BY pgc.rank",
        )?)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub(crate) fn memory_store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        SqliteStore::create_tables(&conn).unwrap();
        conn
    }

    pub(crate) fn fixture(
        psm_id: &'static str,
        peptide: &'static str,
        score: i64,
        proteins: &[&'static str],
    ) -> Psm<'static> {
        Psm {
            row: 0,
            fields: Vec::new(),
            peptide,
            proteins: proteins.to_vec(),
            psm_id: psm_id.into(),
            score,
            confidence: None,
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn protein_peptide_map() {
        let conn = memory_store();
        let store = SqliteStore::new(&conn);
        store
            .store_psms(&[
                fixture("s1", "AAK", 3, &["P1", "P2"]),
                fixture("s2", "CCK", 4, &["P1"]),
                fixture("s2", "CCK", 4, &["P3"]),
            ])
            .unwrap();
        let graph = store
            .get_protpepmap_from_proteins(&["P1", "P2", "P9"])
            .unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph["P1"], set(&["AAK", "CCK"]));
        assert_eq!(graph["P2"], set(&["AAK"]));

        assert_eq!(store.get_proteins_for_psm("s2").unwrap(), vec!["P1", "P3"]);
        assert_eq!(store.get_peptides_from_protein("P3").unwrap(), set(&["CCK"]));

        let excluded = store
            .filter_proteins_with_missing_peptides(&["P1", "P2", "P3"], &set(&["AAK"]))
            .unwrap();
        assert_eq!(excluded, set(&["P1", "P3"]));
    }

    #[test]
    fn chunked_queries() {
        let conn = memory_store();
        let store = SqliteStore::new(&conn);
        let names = (0..1200).map(|i| format!("P{}", i)).collect::<Vec<_>>();
        let psms = names
            .iter()
            .map(|n| Psm {
                proteins: vec![n.as_str()],
                psm_id: n.clone(),
                peptide: "AAK",
                ..fixture("", "", 1, &[])
            })
            .collect::<Vec<_>>();
        store.store_psms(&psms).unwrap();
        let refs = names.iter().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(store.get_protpepmap_from_proteins(&refs).unwrap().len(), 1200);
        assert_eq!(
            store.get_proteins_peptides_from_psms(&set(&["AAK"])).unwrap().len(),
            1200
        );
    }

    #[test]
    fn masters_and_content() {
        let conn = memory_store();
        let store = SqliteStore::new(&conn);
        store
            .store_masters(&set(&["B", "A"]), &[(0, "A".into()), (3, "B".into())])
            .unwrap();
        assert_eq!(store.get_all_masters().unwrap(), vec!["A", "B"]);

        let rows = vec![
            GroupMember {
                protein: "Z".into(),
                master: "A".into(),
                peptide_count: 2,
                psm_count: 3,
                score: 40,
            },
            GroupMember::empty("A", "A"),
        ];
        store.store_protein_group_content(&rows).unwrap();
        assert_eq!(store.get_protein_group_content("A").unwrap(), rows);
        assert!(store.get_protein_group_content("B").unwrap().is_empty());
    }
}
