#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Which end of a confidence value is the good end
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd)]
pub enum ScoreDirection {
    /// Higher values are better, e.g. svm-score
    Higher,
    /// Lower values are better, e.g. q-value or PEP
    Lower,
}

impl ScoreDirection {
    /// Return true if `value` is strictly better than `threshold`
    pub fn is_better(self, value: f64, threshold: f64) -> bool {
        match self {
            ScoreDirection::Higher => value > threshold,
            ScoreDirection::Lower => value < threshold,
        }
    }
}

#[derive(PartialEq, PartialOrd, Clone, Debug)]
/// A single peptide-spectrum match, borrowed from one line of a PSM table
pub struct Psm<'s> {
    /// Index of the row among all data rows of the table, starting at 0
    pub row: usize,
    /// Every tab-separated field of the line, in header order
    pub fields: Vec<&'s str>,
    /// Peptide sequence
    pub peptide: &'s str,
    /// Protein accessions matched by the peptide
    pub proteins: Vec<&'s str>,
    /// Identifier shared by all lines describing the same spectrum match
    pub psm_id: String,
    /// Integer search engine score, summed into protein scores
    pub score: i64,
    /// Value of the confidence column, if configured and numeric
    pub confidence: Option<f64>,
}

impl<'s> Psm<'s> {
    /// Return true if every matched protein contains the pattern.
    ///
    /// A PSM without proteins never matches
    pub fn all_proteins_match(&self, pattern: &str) -> bool {
        !self.proteins.is_empty() && self.proteins.iter().all(|p| p.contains(pattern))
    }
}

/// Split a protein column cell into accessions, dropping the
/// `(pre=K,post=A)` flanking residue annotations some search engines
/// append to each accession
pub fn split_proteins(cell: &str, separator: char) -> Vec<&str> {
    cell.split(separator)
        .map(|acc| match acc.find("(pre=") {
            Some(ix) => &acc[..ix],
            None => acc,
        })
        .map(str::trim)
        .filter(|acc| !acc.is_empty())
        .collect()
}
