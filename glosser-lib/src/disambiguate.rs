// Collapsing a candidate set: most frequent glosses first, then the shortest.

use crate::index::{char_len, GlossIndex};
use crate::types::CandidateSet;

/// Reduce `candidates` to the glosses with the highest total frequency and,
/// among those, the fewest chars. Remaining ties are all kept.
///
/// Glosses unknown to the index count as frequency 0, so they only survive when
/// no candidate has been seen. Blank candidates are dropped. Sets with fewer
/// than two members are returned unchanged.
pub fn disambiguate(candidates: &CandidateSet, glosses: &GlossIndex) -> CandidateSet {
    if candidates.len() < 2 {
        return candidates.clone();
    }

    let members: Vec<&String> = candidates
        .iter()
        .filter(|g| !g.trim().is_empty())
        .collect();

    let top = members
        .iter()
        .map(|g| glosses.frequency(g))
        .max()
        .unwrap_or(0);
    let frequent: Vec<&String> = members
        .into_iter()
        .filter(|g| glosses.frequency(g) == top)
        .collect();

    let shortest = frequent.iter().map(|g| char_len(g)).min().unwrap_or(0);
    frequent
        .into_iter()
        .filter(|g| char_len(g) == shortest)
        .cloned()
        .collect()
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

    fn set(items: &[&str]) -> CandidateSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_and_singleton_pass_through() {
        let g = glosses("mu\tNOM\n");
        assert!(disambiguate(&CandidateSet::new(), &g).is_empty());
        assert_eq!(disambiguate(&set(&["UNSEEN"]), &g), set(&["UNSEEN"]));
    }

    #[test]
    fn test_frequency_wins() {
        let g = glosses("mu\tNOM.SG\t5\nzu\tNOM\t2\n");
        assert_eq!(disambiguate(&set(&["NOM.SG", "NOM"]), &g), set(&["NOM.SG"]));
    }

    #[test]
    fn test_brevity_breaks_frequency_ties() {
        let g = glosses("mu\tNOM.SG\t3\nzu\tNOM\t3\n");
        assert_eq!(disambiguate(&set(&["NOM.SG", "NOM"]), &g), set(&["NOM"]));
    }

    #[test]
    fn test_unknown_glosses_lose_to_known_ones() {
        let g = glosses("mu\tNOM.SG\n");
        assert_eq!(disambiguate(&set(&["NOM.SG", "X"]), &g), set(&["NOM.SG"]));
    }

    #[test]
    fn test_unknown_glosses_fall_back_to_brevity() {
        let g = glosses("mu\tNOM.SG\n");
        assert_eq!(
            disambiguate(&set(&["AB", "CD", "EFG"]), &g),
            set(&["AB", "CD"])
        );
    }

    #[test]
    fn test_result_independent_of_insertion_order() {
        let g = glosses("mu\tA\t2\nzu\tB\t2\nku\tCC\t2\n");
        let forward: CandidateSet = ["A", "B", "CC"].iter().map(|s| s.to_string()).collect();
        let backward: CandidateSet = ["CC", "B", "A"].iter().map(|s| s.to_string()).collect();
        assert_eq!(disambiguate(&forward, &g), disambiguate(&backward, &g));
        assert_eq!(disambiguate(&forward, &g), set(&["A", "B"]));
    }
}
