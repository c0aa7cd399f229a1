//! Utilities for filtering PSMs based on a set of composable rules
//!
//! ```ignore
//! confidence < 0.01
//! exclude_protein = DECOY_
//! exclude_sequence = C
//! ```
//!
use super::*;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};
mod parse;

/// PSM-level filter
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum PsmFilter {
    /// Include only PSMs whose confidence value is strictly better than the
    /// threshold. PSMs without a readable confidence value are excluded.
    Confidence {
        threshold: f64,
        direction: ScoreDirection,
    },
    /// Exclude PSMs where every matched protein contains the pattern,
    /// e.g. a decoy tag
    ExcludeProtein(String),
    /// Exclude PSMs with a peptide sequence containing the pattern
    SequenceExclude(String),
}

/// Provides filtering functionality on PSMs
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, PartialOrd)]
pub struct Filter {
    psm_filters: Vec<PsmFilter>,
}

impl Filter {
    /// Add a new `PsmFilter` to the `Filter` object.
    ///
    /// This follows the Builder pattern
    pub fn add_psm_filter(mut self, filter: PsmFilter) -> Self {
        self.psm_filters.push(filter);
        self
    }

    /// Append all rules of another filter
    pub fn extend(mut self, other: Filter) -> Self {
        self.psm_filters.extend(other.psm_filters);
        self
    }

    /// Parse filter rules from their text form
    pub fn parse(input: &str) -> Result<Filter, Error> {
        parse::parse(input).map_err(|e| Error::Filter(format!("{:?} in {:?}", e, input)))
    }

    /// Return true if the PSM passes every rule
    pub fn passes(&self, psm: &Psm) -> bool {
        for filter in &self.psm_filters {
            match filter {
                PsmFilter::Confidence {
                    threshold,
                    direction,
                } => match psm.confidence {
                    Some(value) if direction.is_better(value, *threshold) => {}
                    _ => return false,
                },
                PsmFilter::ExcludeProtein(pat) => {
                    if psm.all_proteins_match(pat) {
                        return false;
                    }
                }
                PsmFilter::SequenceExclude(pat) => {
                    if psm.peptide.contains(pat.as_str()) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn psm<'s>(peptide: &'s str, proteins: Vec<&'s str>, confidence: Option<f64>) -> Psm<'s> {
        Psm {
            row: 0,
            fields: Vec::new(),
            peptide,
            proteins,
            psm_id: peptide.into(),
            score: 1,
            confidence,
        }
    }

    #[test]
    fn confidence() {
        let fil = Filter::default().add_psm_filter(PsmFilter::Confidence {
            threshold: 0.01,
            direction: ScoreDirection::Lower,
        });
        assert!(fil.passes(&psm("AAK", vec!["P1"], Some(0.001))));
        assert!(!fil.passes(&psm("AAK", vec!["P1"], Some(0.01))));
        assert!(!fil.passes(&psm("AAK", vec!["P1"], None)));

        let fil = Filter::default().add_psm_filter(PsmFilter::Confidence {
            threshold: 2.0,
            direction: ScoreDirection::Higher,
        });
        assert!(fil.passes(&psm("AAK", vec!["P1"], Some(2.5))));
        assert!(!fil.passes(&psm("AAK", vec!["P1"], Some(-1.0))));
    }

    #[test]
    fn exclusions() {
        let fil = Filter::default()
            .add_psm_filter(PsmFilter::ExcludeProtein("DECOY_".into()))
            .add_psm_filter(PsmFilter::SequenceExclude("C".into()));
        assert!(fil.passes(&psm("AAK", vec!["DECOY_P1", "P2"], None)));
        assert!(!fil.passes(&psm("AAK", vec!["DECOY_P1"], None)));
        assert!(!fil.passes(&psm("ACK", vec!["P2"], None)));
        assert!(Filter::default().passes(&psm("ACK", vec![], None)));
    }
}
