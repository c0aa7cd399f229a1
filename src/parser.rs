//! Parse tab-separated PSM tables
//!

use super::*;

use regex::Regex;
use std::fmt;
use std::iter::Enumerate;
use std::str::Lines;

#[derive(PartialEq, PartialOrd, Debug, Clone)]
pub enum ErrorKind {
    /// Error converting a field to a number
    Conversion(String),
    /// No header field matches the configured column
    MissingColumn(String),
    /// A column pattern matches more than one header field
    AmbiguousColumn(String),
    /// Invalid column pattern
    Pattern(String),
    /// Line has fewer fields than the header
    MissingField,
    /// Unexpected end-of-file
    EOF,
}

/// Error that may occur during parsing of a PSM table
#[derive(PartialEq, PartialOrd, Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub line: usize,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Error parsing PSM table at line {}: {:?}",
            self.line, self.kind
        )
    }
}

impl std::error::Error for Error {}

/// Find a column by exact name, falling back to treating the name as a
/// regular expression that must match exactly one field
pub fn find_column(fields: &[&str], pattern: &str) -> Result<usize, ErrorKind> {
    if let Some(ix) = fields.iter().position(|f| *f == pattern) {
        return Ok(ix);
    }
    let re = Regex::new(pattern).map_err(|_| ErrorKind::Pattern(pattern.into()))?;
    let mut hits = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| re.is_match(f))
        .map(|(ix, _)| ix);
    match (hits.next(), hits.next()) {
        (Some(ix), None) => Ok(ix),
        (None, _) => Err(ErrorKind::MissingColumn(pattern.into())),
        (Some(_), Some(_)) => Err(ErrorKind::AmbiguousColumn(pattern.into())),
    }
}

/// Header line of a PSM table, with configured columns resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Header<'s> {
    pub fields: Vec<&'s str>,
    pub peptide: usize,
    pub protein: usize,
    pub score: usize,
    /// Either the PSM id column, or spectra file and scan number
    psm_id: PsmId,
    pub confidence: Option<usize>,
    pub separator: char,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PsmId {
    Column(usize),
    Scan { specfile: usize, scan: usize },
}

impl<'s> Header<'s> {
    /// Resolve the columns named in `config` against a header line
    pub fn new(line: &'s str, config: &Config) -> Result<Header<'s>, ErrorKind> {
        let fields: Vec<&str> = line.split('\t').collect();
        let psm_id = match &config.psm_id_column {
            Some(col) => PsmId::Column(find_column(&fields, col)?),
            None => PsmId::Scan {
                specfile: find_column(&fields, &config.specfile_column)?,
                scan: find_column(&fields, &config.scan_column)?,
            },
        };
        let confidence = match &config.confidence_column {
            Some(col) => Some(find_column(&fields, col)?),
            None => None,
        };
        Ok(Header {
            peptide: find_column(&fields, &config.peptide_column)?,
            protein: find_column(&fields, &config.protein_column)?,
            score: find_column(&fields, &config.score_column)?,
            psm_id,
            confidence,
            separator: config.protein_separator,
            fields,
        })
    }

    /// Number of fields in the header
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn psm_id(&self, fields: &[&str]) -> String {
        match self.psm_id {
            PsmId::Column(ix) => fields[ix].to_string(),
            PsmId::Scan { specfile, scan } => {
                format!("{}_{}_{}", fields[specfile], fields[scan], fields[self.peptide])
            }
        }
    }
}

/// Parse an integer score. Decimal scores are truncated toward zero
fn parse_score(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

/// Lazy reader over the data rows of a PSM table
pub struct Parser<'s> {
    iter: Enumerate<Lines<'s>>,
    header: Header<'s>,
    /// Number of data rows seen, blank lines excluded
    row: usize,
}

impl<'s> Parser<'s> {
    /// Create a new parser operating on the full text of a PSM table. The
    /// header line is read immediately.
    pub fn new(input: &'s str, config: &Config) -> Result<Parser<'s>, Error> {
        let mut iter = input.lines().enumerate();
        let (_, line) = iter.next().ok_or(Error {
            kind: ErrorKind::EOF,
            line: 1,
        })?;
        let header = Header::new(line, config).map_err(|kind| Error { kind, line: 1 })?;
        Ok(Parser {
            iter,
            header,
            row: 0,
        })
    }

    pub fn header(&self) -> &Header<'s> {
        &self.header
    }

    fn parse_psm(&mut self, line: &'s str, lineno: usize) -> Result<Psm<'s>, Error> {
        let err = |kind| Error { kind, line: lineno };
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < self.header.len() {
            return Err(err(ErrorKind::MissingField));
        }
        let h = &self.header;
        let score = parse_score(fields[h.score])
            .ok_or_else(|| err(ErrorKind::Conversion(h.fields[h.score].into())))?;
        let confidence = h.confidence.and_then(|ix| fields[ix].trim().parse::<f64>().ok());
        let psm = Psm {
            row: self.row,
            peptide: fields[h.peptide],
            proteins: psm::split_proteins(fields[h.protein], h.separator),
            psm_id: h.psm_id(&fields),
            score,
            confidence,
            fields,
        };
        self.row += 1;
        Ok(psm)
    }
}

impl<'s> Iterator for Parser<'s> {
    type Item = Result<Psm<'s>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (ix, line) = self.iter.next()?;
            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse_psm(line, ix + 1));
        }
    }
}
