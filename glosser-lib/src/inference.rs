// Gloss prediction for a single form.
//
// Known forms are answered from the dictionary. For unseen forms we look up the
// longest known prefix (left) and suffix (right) in the affix index, keep the
// most frequent maximal gloss fragments for each side, and then run a cascade
// of merge strategies. The first strategy to produce any candidate wins.

use std::collections::HashMap;

use log::debug;

use crate::dictionary::Dictionary;
use crate::index::{
    char_len, drop_first_char, drop_last_char, last_chars, skip_chars, take_chars, GlossIndex,
    Indices,
};
use crate::types::{CandidateSet, Code, Prediction, Strategy, ABSENT};

/// Read-only inputs shared by every merge strategy.
pub struct MergeInput<'a> {
    pub left: &'a CandidateSet,
    pub right: &'a CandidateSet,
    pub glosses: &'a GlossIndex,
}

/// A merge strategy: a pure function from left/right candidates to a merged set.
pub type MergeFn = fn(&MergeInput) -> CandidateSet;

/// The merge cascade, in order of application.
pub const CASCADE: [(Strategy, MergeFn); 10] = [
    (Strategy::Intersection, intersection),
    (Strategy::Containment, containment),
    (Strategy::SubstringTrim, substring_trim),
    (Strategy::OverlapConcat, overlap_concat),
    (Strategy::LooseContainment, loose_containment),
    (Strategy::GlossBridge, gloss_bridge),
    (Strategy::BestOverlapBridge, best_overlap_bridge),
    (Strategy::FrequentFragment, frequent_fragment),
    (Strategy::AnyDepthFragment, any_depth_fragment),
    (Strategy::FragmentExpansion, fragment_expansion),
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Predicts glosses from an immutable dictionary and its indices.
#[derive(Clone, Copy)]
pub struct InferenceEngine<'a> {
    dictionary: &'a Dictionary,
    indices: &'a Indices,
}

impl<'a> InferenceEngine<'a> {
    pub fn new(dictionary: &'a Dictionary, indices: &'a Indices) -> Self {
        Self {
            dictionary,
            indices,
        }
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dictionary
    }

    pub fn indices(&self) -> &'a Indices {
        self.indices
    }

    /// Predict glosses for `form`.
    pub fn predict(&self, form: &str) -> Prediction {
        let previous = self.dictionary.most_frequent(form);
        if !previous.is_empty() {
            let placeholder: CandidateSet = [ABSENT.to_string()].into();
            return Prediction {
                code: Code::Dictionary,
                merged: previous.clone(),
                previous,
                left: placeholder.clone(),
                right: placeholder,
                attempted: vec![],
            };
        }

        let left = self.left_candidates(form);
        let right = self.right_candidates(form);
        let input = MergeInput {
            left: &left,
            right: &right,
            glosses: &self.indices.glosses,
        };

        let mut attempted = Vec::new();
        let mut code = Code::Inferred(None);
        let mut merged = CandidateSet::new();
        for (strategy, merge) in CASCADE {
            attempted.push(strategy);
            merged = merge(&input);
            if !merged.is_empty() {
                code = Code::Inferred(Some(strategy));
                break;
            }
        }
        debug!(
            "{form}: left {left:?}, right {right:?}, tried {}, merged {merged:?}",
            attempted.iter().map(|s| s.letter()).collect::<String>()
        );

        Prediction {
            code,
            previous: CandidateSet::new(),
            left,
            right,
            merged,
            attempted,
        }
    }

    /// Most frequent maximal gloss prefixes under the longest known form prefix.
    pub fn left_candidates(&self, form: &str) -> CandidateSet {
        match self.indices.affixes.longest_left_match(form) {
            Some((_, cell)) => maximal(most_counted(cell), |long, short| long.starts_with(short)),
            None => CandidateSet::new(),
        }
    }

    /// Most frequent maximal gloss suffixes under the longest known form suffix.
    pub fn right_candidates(&self, form: &str) -> CandidateSet {
        match self.indices.affixes.longest_right_match(form.trim()) {
            Some((_, cell)) => maximal(most_counted(cell), |long, short| long.ends_with(short)),
            None => CandidateSet::new(),
        }
    }
}

/// Fragments with the highest count. Ties are kept.
fn most_counted(cell: &HashMap<String, u32>) -> CandidateSet {
    let top = cell.values().copied().max().unwrap_or(0);
    cell.iter()
        .filter(|(_, count)| **count == top)
        .map(|(fragment, _)| fragment.clone())
        .collect()
}

/// Drop every fragment that another, different fragment extends.
fn maximal(fragments: CandidateSet, extends: impl Fn(&str, &str) -> bool) -> CandidateSet {
    fragments
        .iter()
        .filter(|short| {
            !fragments
                .iter()
                .any(|long| long != *short && extends(long.as_str(), short.as_str()))
        })
        .cloned()
        .collect()
}

/// Length ignoring surrounding whitespace, used for the strategy length floors.
fn trimmed_len(s: &str) -> usize {
    char_len(s.trim())
}

// ---------------------------------------------------------------------------
// Merge strategies
// ---------------------------------------------------------------------------

/// (a) Glosses found identically on both sides.
fn intersection(input: &MergeInput) -> CandidateSet {
    input
        .left
        .iter()
        .filter(|l| trimmed_len(l) > 0 && input.right.contains(*l))
        .cloned()
        .collect()
}

/// Left ending with right keeps left; right starting with left keeps right.
fn containment_with_floor(input: &MergeInput, floor: usize) -> CandidateSet {
    let mut out = CandidateSet::new();
    for l in input.left.iter().filter(|l| trimmed_len(l) > floor) {
        for r in input.right.iter().filter(|r| trimmed_len(r) > floor) {
            if l.ends_with(r.as_str()) {
                out.insert(l.clone());
            } else if r.starts_with(l.as_str()) {
                out.insert(r.clone());
            }
        }
    }
    out
}

/// (b) Containment at the boundary, at least two chars on each side.
fn containment(input: &MergeInput) -> CandidateSet {
    containment_with_floor(input, 1)
}

/// (c) One side inside the other: keep the container up to and including
/// the first occurrence.
fn substring_trim(input: &MergeInput) -> CandidateSet {
    let mut out = CandidateSet::new();
    for l in input.left.iter().filter(|l| trimmed_len(l) > 1) {
        for r in input.right.iter().filter(|r| trimmed_len(r) > 1) {
            if let Some(at) = r.find(l.as_str()) {
                out.insert(r[..at + l.len()].to_string());
            } else if let Some(at) = l.find(r.as_str()) {
                out.insert(l[..at + r.len()].to_string());
            }
        }
    }
    out
}

/// (d) Left's ending overlaps right's beginning: concatenate. The required
/// overlap starts at two chars and only grows; results at a smaller overlap
/// are dropped once a longer one is found.
fn overlap_concat(input: &MergeInput) -> CandidateSet {
    let mut out = CandidateSet::new();
    let mut overlap = 2;
    for l in input.left {
        if trimmed_len(l) <= overlap {
            continue;
        }
        for r in input.right {
            if trimmed_len(r) <= overlap {
                continue;
            }
            if l.ends_with(take_chars(r, overlap)) {
                out.insert(format!("{l}{}", skip_chars(r, overlap)));
            }
            let r_len = char_len(r);
            while overlap < r_len && l.ends_with(take_chars(r, overlap + 1)) {
                out.clear();
                overlap += 1;
                out.insert(format!("{l}{}", skip_chars(r, overlap)));
            }
        }
    }
    out
}

/// (e) Containment at the boundary with no length floor.
fn loose_containment(input: &MergeInput) -> CandidateSet {
    containment_with_floor(input, 0)
}

/// (f) Known glosses that start with a left fragment and end with a right one.
fn gloss_bridge(input: &MergeInput) -> CandidateSet {
    let mut out = CandidateSet::new();
    for lg in input.left {
        let Some(starting) = input.glosses.with_prefix(lg) else {
            continue;
        };
        for g in starting {
            let bridged = input.right.iter().any(|rg| {
                input
                    .glosses
                    .with_suffix(rg)
                    .is_some_and(|ending| ending.contains(g))
            });
            if bridged {
                out.insert(g.clone());
            }
        }
    }
    out
}

/// (g) Known glosses sharing a beginning of left (depth `i`) and an ending of
/// right (depth `j`, i.e. `j + 1` chars). Only the largest `i + j` survives.
fn best_overlap_bridge(input: &MergeInput) -> CandidateSet {
    let mut out = CandidateSet::new();
    let mut best = 0;
    for lg in input.left {
        for i in 2..char_len(lg) {
            let l = take_chars(lg, i);
            let Some(starting) = input.glosses.with_prefix(l) else {
                continue;
            };
            for rg in input.right {
                for j in 2..char_len(rg) {
                    if i + j < best {
                        continue;
                    }
                    let Some(ending) = input.glosses.with_suffix(last_chars(rg, j + 1)) else {
                        continue;
                    };
                    for g in starting.iter().filter(|g| ending.contains(*g)) {
                        if i + j > best {
                            best = i + j;
                            out.clear();
                        }
                        out.insert(g.clone());
                    }
                }
            }
        }
    }
    out
}

/// (h) Fragments that are themselves known glosses seen more than once.
fn frequent_fragment(input: &MergeInput) -> CandidateSet {
    input
        .left
        .iter()
        .chain(input.right)
        .filter(|g| char_len(g) > 1 && input.glosses.frequency(g) > 1)
        .cloned()
        .collect()
}

/// (i) Any beginning of a left fragment or ending of a right fragment (two
/// chars or more) that is a known gloss.
fn any_depth_fragment(input: &MergeInput) -> CandidateSet {
    let mut out = CandidateSet::new();
    for lg in input.left {
        let mut l = lg.as_str();
        while char_len(l) > 1 {
            if input.glosses.contains(l) {
                out.insert(l.to_string());
            }
            l = drop_last_char(l);
        }
    }
    for rg in input.right {
        let mut r = rg.as_str();
        while char_len(r) > 1 {
            if input.glosses.contains(r) {
                out.insert(r.to_string());
            }
            r = drop_first_char(r);
        }
    }
    out
}

/// (j) Every known gloss beginning with a left or ending with a right fragment.
fn fragment_expansion(input: &MergeInput) -> CandidateSet {
    let mut out = CandidateSet::new();
    for lg in input.left.iter().filter(|l| !l.is_empty()) {
        if let Some(glosses) = input.glosses.with_prefix(lg) {
            out.extend(glosses.iter().cloned());
        }
    }
    for rg in input.right.iter().filter(|r| !r.is_empty()) {
        if let Some(glosses) = input.glosses.with_suffix(rg) {
            out.extend(glosses.iter().cloned());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{Ingestor, SamplingConfig};
    use crate::index::IndexConfig;

    fn dict(text: &str) -> Dictionary {
        let mut ingestor = Ingestor::new(SamplingConfig::default()).unwrap();
        ingestor.ingest("test", text.as_bytes()).unwrap();
        ingestor.finish().unwrap().0
    }

    fn set(items: &[&str]) -> CandidateSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn run(merge: MergeFn, left: &[&str], right: &[&str], glosses: &GlossIndex) -> Vec<String> {
        let (left, right) = (set(left), set(right));
        let input = MergeInput {
            left: &left,
            right: &right,
            glosses,
        };
        merge(&input).into_iter().collect()
    }

    fn gloss_index(text: &str) -> GlossIndex {
        GlossIndex::build(&dict(text))
    }

    #[test]
    fn test_dictionary_match_short_circuits() {
        let d = dict("mu\tNOM.SG\t5\nmu\tGEN\t1\n");
        let indices = Indices::build(&d, &IndexConfig::default());
        let p = InferenceEngine::new(&d, &indices).predict("mu");
        assert_eq!(p.code, Code::Dictionary);
        assert_eq!(p.previous, set(&["NOM.SG"]));
        assert_eq!(p.merged, p.previous);
        assert_eq!(p.left, set(&["_"]));
        assert_eq!(p.right, set(&["_"]));
        assert!(p.attempted.is_empty());
    }

    #[test]
    fn test_left_candidates_keep_maximal_fragments() {
        let d = dict("lugal-e\tAGT-king\nlugal\tking\n");
        let indices = Indices::build(&d, &IndexConfig::default());
        let engine = InferenceEngine::new(&d, &indices);
        assert_eq!(engine.left_candidates("lugal-ra"), set(&["AGT-king"]));
        assert!(engine.right_candidates("lugal-ra").is_empty());
    }

    #[test]
    fn test_right_candidates_keep_maximal_fragments() {
        let d = dict("zzcd\tROOT\n");
        let indices = Indices::build(&d, &IndexConfig::default());
        let engine = InferenceEngine::new(&d, &indices);
        // All suffixes of ROOT tie at count 1; only the longest survives.
        assert_eq!(engine.right_candidates("abcd"), set(&["ROOT"]));
    }

    #[test]
    fn test_unknown_form_without_matches() {
        let d = dict("mu\tNOM.SG\n");
        let indices = Indices::build(&d, &IndexConfig::default());
        let p = InferenceEngine::new(&d, &indices).predict("xyz");
        assert_eq!(p.code, Code::Inferred(None));
        assert!(p.merged.is_empty());
        assert_eq!(p.attempted.len(), 10);
    }

    #[test]
    fn test_intersection_wins_over_containment() {
        let d = dict("abzz\tROOT\nzzcd\tROOT\n");
        let indices = Indices::build(&d, &IndexConfig::default());
        let p = InferenceEngine::new(&d, &indices).predict("abcd");
        assert_eq!(p.code, Code::Inferred(Some(Strategy::Intersection)));
        assert_eq!(p.merged, set(&["ROOT"]));
        assert_eq!(p.attempted, vec![Strategy::Intersection]);
    }

    #[test]
    fn test_containment_when_sides_differ() {
        let d = dict("abzz\tX-ROOT\nzzcd\tROOT\n");
        let indices = Indices::build(&d, &IndexConfig::default());
        let p = InferenceEngine::new(&d, &indices).predict("abcd");
        assert_eq!(p.code, Code::Inferred(Some(Strategy::Containment)));
        assert_eq!(p.merged, set(&["X-ROOT"]));
    }

    #[test]
    fn test_containment_rules() {
        let g = GlossIndex::default();
        assert_eq!(run(containment, &["AGT-king"], &["king"], &g), ["AGT-king"]);
        assert_eq!(run(containment, &["AGT"], &["AGT-king-x"], &g), ["AGT-king-x"]);
        assert!(run(containment, &["N"], &["NOM"], &g).is_empty());
        assert_eq!(run(loose_containment, &["N"], &["NOM"], &g), ["NOM"]);
    }

    #[test]
    fn test_substring_trim() {
        let g = GlossIndex::default();
        assert_eq!(run(substring_trim, &["ab"], &["xxabyyab"], &g), ["xxab"]);
        assert_eq!(run(substring_trim, &["xxabyy"], &["ab"], &g), ["xxab"]);
        assert!(run(substring_trim, &["a"], &["xxayy"], &g).is_empty());
    }

    #[test]
    fn test_overlap_concat() {
        let g = GlossIndex::default();
        assert_eq!(run(overlap_concat, &["NOM.SG"], &["SG.PL"], &g), ["NOM.SG.PL"]);
        // The overlap grows past the two-char minimum.
        assert_eq!(run(overlap_concat, &["abcde"], &["cdeXY"], &g), ["abcdeXY"]);
        // A longer overlap discards results found at a shorter one.
        assert_eq!(
            run(overlap_concat, &["abcde", "xxde"], &["deXY", "cdeZ"], &g),
            ["abcdeZ"]
        );
        assert!(run(overlap_concat, &["abc"], &["xyz"], &g).is_empty());
    }

    #[test]
    fn test_gloss_bridge() {
        let g = gloss_index("mu\tNOM.SG\nzu\tNOM.PL\n");
        assert_eq!(run(gloss_bridge, &["NOM"], &["SG"], &g), ["NOM.SG"]);
        assert!(run(gloss_bridge, &["NOM"], &["XX"], &g).is_empty());
    }

    #[test]
    fn test_best_overlap_bridge() {
        let g = gloss_index("mu\tNOM.SG\nzu\tNOM.PL\n");
        assert_eq!(
            run(best_overlap_bridge, &["NOMxx"], &["yy.SG"], &g),
            ["NOM.SG"]
        );
        assert!(run(best_overlap_bridge, &["NOMxx"], &["yyyyy"], &g).is_empty());
    }

    #[test]
    fn test_frequent_fragment_requires_repeat() {
        let g = gloss_index("mu\tGEN\t2\nzu\tACC\n");
        assert_eq!(run(frequent_fragment, &["GEN"], &["XY"], &g), ["GEN"]);
        assert!(run(frequent_fragment, &["ACC"], &["XY"], &g).is_empty());
    }

    #[test]
    fn test_any_depth_fragment() {
        let g = gloss_index("mu\tGEN\nzu\tACC\n");
        assert_eq!(run(any_depth_fragment, &["GENxx"], &[], &g), ["GEN"]);
        assert_eq!(run(any_depth_fragment, &[], &["xxACC"], &g), ["ACC"]);
    }

    #[test]
    fn test_fragment_expansion() {
        let g = gloss_index("mu\tNOM.SG\nzu\tNOM.PL\nka\tGEN.PL\n");
        assert_eq!(
            run(fragment_expansion, &["NO"], &[], &g),
            ["NOM.PL", "NOM.SG"]
        );
        assert_eq!(
            run(fragment_expansion, &[], &[".PL"], &g),
            ["GEN.PL", "NOM.PL"]
        );
    }

    #[test]
    fn test_unseen_form_uses_cascade() {
        let d = dict("lugal-e\tAGT-king\nlugal\tking\n");
        let indices = Indices::build(&d, &IndexConfig::default());
        let p = InferenceEngine::new(&d, &indices).predict("lugal-ra");
        assert_eq!(p.code, Code::Inferred(Some(Strategy::AnyDepthFragment)));
        assert_eq!(p.merged, set(&["AGT-king"]));
    }
}
