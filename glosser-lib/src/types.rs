use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Marker rendered for an empty candidate set or an unknown baseline.
pub const ABSENT: &str = "_";

/// A set of gloss candidates. Ordered so that rendering is deterministic.
pub type CandidateSet = BTreeSet<String>;

/// One dictionary row: a surface form, its gloss and how often it was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub form: String,
    pub gloss: String,
    pub frequency: u64,
}

/// Merge strategies for unseen forms, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strategy {
    /// (a) Left and right produce the same gloss.
    Intersection,
    /// (b) Left ends with right, or right starts with left (>1 chars).
    Containment,
    /// (c) One side contains the other; cut after the first occurrence.
    SubstringTrim,
    /// (d) Left's ending overlaps right's beginning; concatenate.
    OverlapConcat,
    /// (e) Like (b) without the length floor.
    LooseContainment,
    /// (f) Known gloss starting with left and ending with right.
    GlossBridge,
    /// (g) Known gloss sharing the longest beginning of left and end of right.
    BestOverlapBridge,
    /// (h) Left or right is itself a known gloss seen more than once.
    FrequentFragment,
    /// (i) Some beginning of left or end of right is a known gloss.
    AnyDepthFragment,
    /// (j) All known glosses beginning with left or ending with right.
    FragmentExpansion,
}

impl Strategy {
    pub const ALL: [Strategy; 10] = [
        Strategy::Intersection,
        Strategy::Containment,
        Strategy::SubstringTrim,
        Strategy::OverlapConcat,
        Strategy::LooseContainment,
        Strategy::GlossBridge,
        Strategy::BestOverlapBridge,
        Strategy::FrequentFragment,
        Strategy::AnyDepthFragment,
        Strategy::FragmentExpansion,
    ];

    /// Single-letter code used in the CODE column.
    pub fn letter(self) -> char {
        match self {
            Strategy::Intersection => 'a',
            Strategy::Containment => 'b',
            Strategy::SubstringTrim => 'c',
            Strategy::OverlapConcat => 'd',
            Strategy::LooseContainment => 'e',
            Strategy::GlossBridge => 'f',
            Strategy::BestOverlapBridge => 'g',
            Strategy::FrequentFragment => 'h',
            Strategy::AnyDepthFragment => 'i',
            Strategy::FragmentExpansion => 'j',
        }
    }
}

/// How a prediction was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// The form is in the training dictionary.
    Dictionary,
    /// The form is unseen. Carries the strategy that produced the merged
    /// candidates, or `None` if every strategy came up empty.
    Inferred(Option<Strategy>),
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Code::Dictionary => f.write_str("D"),
            Code::Inferred(None) => f.write_str("I"),
            Code::Inferred(Some(s)) => write!(f, "I{}", s.letter()),
        }
    }
}

/// Raw engine output for one form, before disambiguation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub code: Code,
    /// Most frequent dictionary glosses for the form (empty if unseen).
    pub previous: CandidateSet,
    /// Maximal gloss fragments from the longest known form prefix.
    pub left: CandidateSet,
    /// Maximal gloss fragments from the longest known form suffix.
    pub right: CandidateSet,
    pub merged: CandidateSet,
    /// Every strategy tried, in order. Empty for dictionary matches.
    pub attempted: Vec<Strategy>,
}

/// The annotation columns appended to a query line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Columns {
    pub base: String,
    pub code: String,
    pub previous: String,
    pub left: String,
    pub right: String,
    pub merged: String,
}

impl Columns {
    /// Columns for a line that carries no usable form.
    pub fn absent() -> Self {
        Self {
            base: ABSENT.to_string(),
            code: String::new(),
            previous: ABSENT.to_string(),
            left: ABSENT.to_string(),
            right: ABSENT.to_string(),
            merged: ABSENT.to_string(),
        }
    }
}

/// One processed query line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// The input line with trailing whitespace removed.
    pub line: String,
    /// The queried form, or `None` for comment and blank lines.
    pub form: Option<String>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Columns>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_letters_follow_cascade_order() {
        let letters: String = Strategy::ALL.iter().map(|s| s.letter()).collect();
        assert_eq!(letters, "abcdefghij");
    }

    #[test]
    fn test_code_display() {
        assert_eq!(Code::Dictionary.to_string(), "D");
        assert_eq!(Code::Inferred(None).to_string(), "I");
        assert_eq!(
            Code::Inferred(Some(Strategy::OverlapConcat)).to_string(),
            "Id"
        );
    }
}
