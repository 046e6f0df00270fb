// Affix and gloss indices, built once from the finished dictionary.
//
// The affix index maps form fragments (prefixes on the left, suffixes on the
// right) to counts of gloss fragments taken from the same side. The gloss index
// holds total gloss frequencies plus lookups from short gloss prefixes and
// suffixes to the whole glosses they belong to.
//
// All fragment lengths are counted in chars.

use std::collections::{HashMap, HashSet};

use log::info;

use crate::dictionary::Dictionary;
use crate::errors::{GlossError, Result};

/// Gloss-fragment counts per form fragment.
pub type FragmentCounts = HashMap<String, HashMap<String, u32>>;

/// Minimum fragment lengths for the affix index.
///
/// The defaults are 2 on the left and 1 on the right. Changing either one
/// changes which fragments are indexed and therefore the predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    pub left_floor: usize,
    pub right_floor: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            left_floor: 2,
            right_floor: 1,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        if self.left_floor == 0 {
            return Err(GlossError::invalid_argument("left_floor", "must be at least 1"));
        }
        if self.right_floor == 0 {
            return Err(GlossError::invalid_argument("right_floor", "must be at least 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Char-boundary helpers
// ---------------------------------------------------------------------------

/// Byte offsets of every char boundary in `s`, including `s.len()`.
fn boundaries(s: &str) -> Vec<usize> {
    s.char_indices().map(|(i, _)| i).chain([s.len()]).collect()
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first `n` chars of `s` (all of `s` if shorter).
pub(crate) fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// `s` without its first `n` chars (empty if shorter).
pub(crate) fn skip_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[i..],
        None => "",
    }
}

/// The last `n` chars of `s` (all of `s` if shorter).
pub(crate) fn last_chars(s: &str, n: usize) -> &str {
    let len = char_len(s);
    skip_chars(s, len.saturating_sub(n))
}

pub(crate) fn drop_last_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next_back();
    chars.as_str()
}

pub(crate) fn drop_first_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.as_str()
}

/// Fragment length at `depth` for the given floor, clamped to `len`.
fn fragment_len(depth: usize, floor: usize, len: usize) -> usize {
    depth.saturating_add(floor.saturating_sub(1)).min(len)
}

fn bump(cell: &mut HashMap<String, u32>, fragment: &str) {
    match cell.get_mut(fragment) {
        Some(count) => *count += 1,
        None => {
            cell.insert(fragment.to_string(), 1);
        }
    }
}

// ---------------------------------------------------------------------------
// Affix index
// ---------------------------------------------------------------------------

/// Form prefixes/suffixes mapped to counts of gloss prefixes/suffixes.
#[derive(Debug, Default)]
pub struct AffixIndex {
    left: FragmentCounts,
    right: FragmentCounts,
}

impl AffixIndex {
    pub fn build(dict: &Dictionary, config: &IndexConfig) -> Self {
        let mut left = FragmentCounts::new();
        let mut right = FragmentCounts::new();

        for (form, glosses) in dict.iter() {
            let fb = boundaries(form);
            let n = fb.len() - 1;
            let gloss_bounds: Vec<(&str, Vec<usize>)> = glosses
                .keys()
                .map(|g| (g.as_str(), boundaries(g)))
                .collect();

            // Depth `i` maps to fragment length `i + floor - 1`, clamped to the
            // whole string. For floors above 1 the whole string is therefore
            // counted more than once.
            for i in 1..=n {
                let prefix = &form[..fb[fragment_len(i, config.left_floor, n)]];
                let cell = left.entry(prefix.to_string()).or_default();
                for (gloss, gb) in &gloss_bounds {
                    let m = gb.len() - 1;
                    for j in 1..=m {
                        bump(cell, &gloss[..gb[fragment_len(j, config.left_floor, m)]]);
                    }
                }

                let suffix = &form[fb[n - fragment_len(i, config.right_floor, n)]..];
                let cell = right.entry(suffix.to_string()).or_default();
                for (gloss, gb) in &gloss_bounds {
                    let m = gb.len() - 1;
                    for j in 1..=m {
                        bump(cell, &gloss[gb[m - fragment_len(j, config.right_floor, m)]..]);
                    }
                }
            }
        }

        Self { left, right }
    }

    pub fn left(&self, prefix: &str) -> Option<&HashMap<String, u32>> {
        self.left.get(prefix)
    }

    pub fn right(&self, suffix: &str) -> Option<&HashMap<String, u32>> {
        self.right.get(suffix)
    }

    /// The longest prefix of `form` present in the left index, with its cell.
    pub fn longest_left_match<'a>(
        &self,
        form: &'a str,
    ) -> Option<(&'a str, &HashMap<String, u32>)> {
        let mut prefix = form;
        while !prefix.is_empty() {
            if let Some(cell) = self.left.get(prefix) {
                return Some((prefix, cell));
            }
            prefix = drop_last_char(prefix);
        }
        None
    }

    /// The longest suffix of `form` present in the right index, with its cell.
    pub fn longest_right_match<'a>(
        &self,
        form: &'a str,
    ) -> Option<(&'a str, &HashMap<String, u32>)> {
        let mut suffix = form;
        while !suffix.is_empty() {
            if let Some(cell) = self.right.get(suffix) {
                return Some((suffix, cell));
            }
            suffix = drop_first_char(suffix);
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Gloss index
// ---------------------------------------------------------------------------

/// Whole-gloss frequencies and fragment-to-gloss lookups.
#[derive(Debug, Default)]
pub struct GlossIndex {
    frequencies: HashMap<String, u64>,
    by_prefix: HashMap<String, HashSet<String>>,
    by_suffix: HashMap<String, HashSet<String>>,
}

impl GlossIndex {
    pub fn build(dict: &Dictionary) -> Self {
        let mut frequencies: HashMap<String, u64> = HashMap::new();
        for (_, glosses) in dict.iter() {
            for (gloss, freq) in glosses {
                *frequencies.entry(gloss.clone()).or_insert(0) += freq;
            }
        }

        let mut by_prefix: HashMap<String, HashSet<String>> = HashMap::new();
        let mut by_suffix: HashMap<String, HashSet<String>> = HashMap::new();
        for gloss in frequencies.keys() {
            let gb = boundaries(gloss);
            let m = gb.len() - 1;
            // Prefixes of length 1..=m-2 and suffixes of length 0..=m-3. The
            // empty suffix therefore lists every gloss of 3+ chars.
            for i in 0..m.saturating_sub(2) {
                by_prefix
                    .entry(gloss[..gb[i + 1]].to_string())
                    .or_default()
                    .insert(gloss.clone());
                by_suffix
                    .entry(gloss[gb[m - i]..].to_string())
                    .or_default()
                    .insert(gloss.clone());
            }
        }

        Self {
            frequencies,
            by_prefix,
            by_suffix,
        }
    }

    /// Total frequency of a whole gloss; 0 if unknown.
    pub fn frequency(&self, gloss: &str) -> u64 {
        self.frequencies.get(gloss).copied().unwrap_or(0)
    }

    pub fn contains(&self, gloss: &str) -> bool {
        self.frequencies.contains_key(gloss)
    }

    pub fn with_prefix(&self, fragment: &str) -> Option<&HashSet<String>> {
        self.by_prefix.get(fragment)
    }

    pub fn with_suffix(&self, fragment: &str) -> Option<&HashSet<String>> {
        self.by_suffix.get(fragment)
    }

    /// Every known gloss with its total frequency.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.frequencies.iter().map(|(g, &f)| (g.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Every index the inference engine reads. Immutable once built.
#[derive(Debug, Default)]
pub struct Indices {
    pub affixes: AffixIndex,
    pub glosses: GlossIndex,
}

impl Indices {
    pub fn build(dict: &Dictionary, config: &IndexConfig) -> Self {
        info!("building indices over {} forms", dict.len());
        let affixes = AffixIndex::build(dict, config);
        let glosses = GlossIndex::build(dict);
        info!(
            "indexed {} left and {} right form fragments, {} glosses",
            affixes.left.len(),
            affixes.right.len(),
            glosses.len()
        );
        Self { affixes, glosses }
    }
}
