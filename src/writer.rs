//! Tab-separated output tables
use super::*;
use std::io::{self, Write};

pub const HEADER_MASTER_PROTEIN: &str = "Master protein(s)";
pub const HEADER_GROUP_CONTENT: &str = "Protein group(s) content";
pub const HEADER_GROUP_HITS: &str = "Amount of matching proteins in group(s)";

/// Columns added to a PSM table, right after its protein column
pub const PROTEIN_GROUP_HEADER: [&str; 3] =
    [HEADER_MASTER_PROTEIN, HEADER_GROUP_CONTENT, HEADER_GROUP_HITS];

pub const PROTEIN_TABLE_HEADER: [&str; 7] = [
    "Protein accession",
    "# Proteins",
    "Proteins in group",
    "# Unique peptides",
    "# Peptides",
    "# PSMs",
    "Protein score",
];

pub const HEADER_PSM_COUNT: &str = "# PSMs";

/// Insert `items` after position `at` of `fields`
fn splice<'a>(fields: &[&'a str], at: usize, items: &[&'a str]) -> Vec<&'a str> {
    let at = at.min(fields.len());
    let mut out = Vec::with_capacity(fields.len() + items.len());
    out.extend_from_slice(&fields[..at]);
    out.extend_from_slice(items);
    out.extend_from_slice(&fields[at..]);
    out
}

/// Header of an annotated PSM table
pub fn header_with_proteingroups<'s>(header: &Header<'s>) -> Vec<&'s str> {
    splice(&header.fields, header.protein + 1, &PROTEIN_GROUP_HEADER)
}

/// Write the PSM table with protein group columns. Rows without a master,
/// such as filtered rows, get empty cells
pub fn write_psm_table<W: Write>(
    mut out: W,
    header: &Header,
    psms: &[Psm],
    dataset: &Dataset,
) -> io::Result<()> {
    writeln!(out, "{}", header_with_proteingroups(header).join("\t"))?;
    for psm in psms {
        let cells = match dataset.annotations.get(&psm.row) {
            Some(a) => [a.masters.as_str(), a.content.as_str(), a.hits.as_str()],
            None => ["", "", ""],
        };
        writeln!(out, "{}", splice(&psm.fields, header.protein + 1, &cells).join("\t"))?;
    }
    out.flush()
}

/// Write one row per protein group
pub fn write_protein_table<W: Write>(mut out: W, dataset: &Dataset) -> io::Result<()> {
    writeln!(out, "{}", PROTEIN_TABLE_HEADER.join("\t"))?;
    for row in tables::protein_table(dataset) {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.master,
            row.members.len(),
            row.members.join(";"),
            row.unique_peptides,
            row.peptide_count,
            row.psm_count,
            row.score
        )?;
    }
    out.flush()
}

/// Write one row per peptide sequence, from its best scoring PSM
pub fn write_peptide_table<W: Write>(
    mut out: W,
    header: &Header,
    psms: &[Psm],
    filter: &Filter,
) -> io::Result<()> {
    writeln!(out, "{}\t{}", header.fields.join("\t"), HEADER_PSM_COUNT)?;
    for row in tables::peptide_table(psms, filter) {
        writeln!(out, "{}\t{}", row.psm.fields.join("\t"), row.psm_count)?;
    }
    out.flush()
}
