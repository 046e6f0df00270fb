// Snap synthesized glosses back onto glosses seen in the dictionary.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use log::debug;
use strsim::normalized_levenshtein;

use crate::index::GlossIndex;
use crate::types::ABSENT;

/// Replaces unknown glosses by their nearest known neighbours.
///
/// Similarity is normalized Levenshtein (1.0 for identical strings). Equally
/// similar neighbours are ranked by total frequency; any remaining tie is
/// reported as one `|`-joined label. Resolutions are memoized per input.
pub struct PostEditor<'a> {
    glosses: &'a GlossIndex,
    cache: HashMap<String, String>,
}

impl<'a> PostEditor<'a> {
    pub fn new(glosses: &'a GlossIndex) -> Self {
        Self {
            glosses,
            cache: HashMap::new(),
        }
    }

    /// Correct a rendered `|`-joined field. Known glosses and the absent marker
    /// are kept as they are.
    pub fn correct(&mut self, field: &str) -> String {
        if field == ABSENT {
            return field.to_string();
        }
        let mut labels = BTreeSet::new();
        for gloss in field.split('|') {
            if gloss == ABSENT || self.glosses.contains(gloss) {
                labels.insert(gloss.to_string());
                continue;
            }
            let resolved = self.resolve(gloss);
            labels.extend(resolved.split('|').map(str::to_string));
        }
        labels.into_iter().collect::<Vec<_>>().join("|")
    }

    /// The nearest known gloss(es) to `gloss`, as a `|`-joined label.
    pub fn resolve(&mut self, gloss: &str) -> String {
        if let Some(label) = self.cache.get(gloss) {
            return label.clone();
        }
        let label = self.nearest(gloss);
        debug!("post-edit {gloss:?} -> {label:?}");
        self.cache.insert(gloss.to_string(), label.clone());
        label
    }

    /// Number of distinct inputs resolved so far.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn nearest(&self, gloss: &str) -> String {
        let mut best: BTreeSet<&str> = BTreeSet::new();
        let mut best_similarity = f64::NEG_INFINITY;
        let mut best_frequency = 0;

        for (candidate, frequency) in self.glosses.iter() {
            let similarity = normalized_levenshtein(gloss, candidate);
            let rank = similarity
                .partial_cmp(&best_similarity)
                .unwrap_or(Ordering::Less)
                .then(frequency.cmp(&best_frequency));
            match rank {
                Ordering::Greater => {
                    best.clear();
                    best.insert(candidate);
                    best_similarity = similarity;
                    best_frequency = frequency;
                }
                Ordering::Equal => {
                    best.insert(candidate);
                }
                Ordering::Less => {}
            }
        }

        if best.is_empty() {
            return gloss.to_string();
        }
        best.into_iter().collect::<Vec<_>>().join("|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{Ingestor, SamplingConfig};

    fn glosses(text: &str) -> GlossIndex {
        let mut ingestor = Ingestor::new(SamplingConfig::default()).unwrap();
        ingestor.ingest("test", text.as_bytes()).unwrap();
        GlossIndex::build(&ingestor.finish().unwrap().0)
    }

    #[test]
    fn test_nearest_by_edit_distance() {
        let g = glosses("mu\tNOM.SG\t5\nzu\tNOM.PL\t2\n");
        let mut editor = PostEditor::new(&g);
        assert_eq!(editor.resolve("NOM.S"), "NOM.SG");
    }

    #[test]
    fn test_frequency_breaks_similarity_ties() {
        let g = glosses("mu\tAB\nzu\tAC\t3\n");
        let mut editor = PostEditor::new(&g);
        assert_eq!(editor.resolve("AX"), "AC");
    }

    #[test]
    fn test_full_ties_are_joined() {
        let g = glosses("mu\tAC\nzu\tAB\n");
        let mut editor = PostEditor::new(&g);
        assert_eq!(editor.resolve("AX"), "AB|AC");
    }

    #[test]
    fn test_correct_keeps_known_and_absent() {
        let g = glosses("mu\tNOM.SG\t5\nzu\tNOM.PL\t2\n");
        let mut editor = PostEditor::new(&g);
        assert_eq!(editor.correct("_"), "_");
        assert_eq!(editor.correct("NOM.PL"), "NOM.PL");
        assert_eq!(editor.correct("NOM.PL|NOM.S"), "NOM.PL|NOM.SG");
        assert_eq!(editor.cached(), 1);
    }

    #[test]
    fn test_resolutions_are_cached() {
        let g = glosses("mu\tNOM.SG\n");
        let mut editor = PostEditor::new(&g);
        editor.correct("NOM");
        editor.correct("NOM");
        editor.correct("GEN");
        assert_eq!(editor.cached(), 2);
    }
}
