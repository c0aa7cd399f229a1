//! Column layout of a PSM table and how to read it
use super::*;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Describes where the interesting columns of a PSM table live.
///
/// Every column is named either by its exact header text or by a regular
/// expression matching exactly one header field.
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub peptide_column: String,
    pub protein_column: String,
    pub specfile_column: String,
    pub scan_column: String,
    /// If set, PSMs are identified by this column instead of
    /// spectra file and scan number
    pub psm_id_column: Option<String>,
    /// Integer score that is summed into protein group scores
    pub score_column: String,
    /// Column used by `PsmFilter::Confidence`
    pub confidence_column: Option<String>,
    pub protein_separator: char,
    /// One protein per line instead of all proteins on one line
    pub unroll: bool,
    /// Filter rules in the text syntax of `Filter::parse`
    pub filters: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            peptide_column: "Peptide".into(),
            protein_column: "Protein".into(),
            specfile_column: "#SpecFile".into(),
            scan_column: "ScanNum".into(),
            psm_id_column: None,
            score_column: "MSGFScore".into(),
            confidence_column: None,
            protein_separator: ';',
            unroll: false,
            filters: Vec::new(),
        }
    }
}

impl Config {
    /// Read a config from a JSON file. Missing keys take default values
    #[cfg(feature = "serialization")]
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> Result<Config, Error> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&s)?)
    }

    /// Build the `Filter` described by the `filters` rules
    pub fn filter(&self) -> Result<Filter, Error> {
        let mut filter = Filter::default();
        for rule in &self.filters {
            filter = filter.extend(Filter::parse(rule)?);
        }
        Ok(filter)
    }
}
