// Training dictionary and held-out evaluation set, filled from TSV sources.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::{GlossError, Result};
use crate::types::{CandidateSet, Observation};

/// Accumulated (form, gloss) frequencies. Read-only once ingestion finishes.
#[derive(Debug, Default)]
pub struct Dictionary {
    entries: HashMap<String, HashMap<String, u64>>,
    /// First gloss seen for each form, used as the baseline prediction.
    first_gloss: HashMap<String, String>,
}

impl Dictionary {
    /// Look up all glosses (with accumulated frequency) recorded for a form.
    pub fn lookup(&self, form: &str) -> Option<&HashMap<String, u64>> {
        self.entries.get(form)
    }

    pub fn contains(&self, form: &str) -> bool {
        self.entries.contains_key(form)
    }

    /// The gloss of the first observation of `form`.
    pub fn first_gloss(&self, form: &str) -> Option<&str> {
        self.first_gloss.get(form).map(String::as_str)
    }

    /// Glosses attaining the highest frequency for `form`. Ties are kept.
    pub fn most_frequent(&self, form: &str) -> CandidateSet {
        let Some(glosses) = self.entries.get(form) else {
            return CandidateSet::new();
        };
        let top = glosses.values().copied().max().unwrap_or(0);
        glosses
            .iter()
            .filter(|(_, freq)| **freq == top)
            .map(|(gloss, _)| gloss.clone())
            .collect()
    }

    /// Number of distinct forms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashMap<String, u64>)> {
        self.entries.iter().map(|(form, glosses)| (form.as_str(), glosses))
    }

    fn record(&mut self, obs: Observation) {
        if !self.first_gloss.contains_key(&obs.form) {
            self.first_gloss.insert(obs.form.clone(), obs.gloss.clone());
        }
        *self
            .entries
            .entry(obs.form)
            .or_default()
            .entry(obs.gloss)
            .or_insert(0) += obs.frequency;
    }
}

/// Forms withheld from training, each with its distinct gold glosses in the
/// order they were first seen.
#[derive(Debug, Default)]
pub struct HeldOut {
    forms: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
}

impl HeldOut {
    pub fn contains(&self, form: &str) -> bool {
        self.positions.contains_key(form)
    }

    pub fn glosses(&self, form: &str) -> Option<&[String]> {
        self.positions
            .get(form)
            .map(|&i| self.forms[i].1.as_slice())
    }

    /// Every (form, gold gloss) pair, forms in first-seen order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forms.iter().flat_map(|(form, glosses)| {
            glosses.iter().map(move |gloss| (form.as_str(), gloss.as_str()))
        })
    }

    /// Number of distinct withheld forms.
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    fn record(&mut self, form: String, gloss: String) {
        let i = match self.positions.get(&form) {
            Some(&i) => i,
            None => {
                self.forms.push((form.clone(), Vec::new()));
                self.positions.insert(form, self.forms.len() - 1);
                self.forms.len() - 1
            }
        };
        let glosses = &mut self.forms[i].1;
        if !glosses.contains(&gloss) {
            glosses.push(gloss);
        }
    }
}

/// How forms are withheld for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Probability that a newly seen form is withheld. 0 disables evaluation.
    pub fraction: f64,
    /// Column holding the gold gloss of withheld rows. Column 0 is the form.
    pub gold_column: usize,
    /// Seed for reproducible sampling; entropy-seeded when `None`.
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            fraction: 0.0,
            gold_column: 1,
            seed: None,
        }
    }
}

impl SamplingConfig {
    pub fn is_active(&self) -> bool {
        self.fraction > 0.0
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.fraction) {
            return Err(GlossError::invalid_argument(
                "fraction",
                format!("{} is outside [0, 1)", self.fraction),
            ));
        }
        if self.gold_column == 0 {
            return Err(GlossError::invalid_argument(
                "gold_column",
                "column 0 holds the form, not a gloss",
            ));
        }
        Ok(())
    }
}

/// Reads dictionary sources into a [`Dictionary`], routing a sampled share of
/// forms into a [`HeldOut`] set when evaluation is active.
pub struct Ingestor<R = StdRng> {
    dictionary: Dictionary,
    held_out: HeldOut,
    /// Routing decision per form, drawn once at the form's first observation.
    withheld: HashMap<String, bool>,
    sampling: SamplingConfig,
    rng: R,
}

impl Ingestor<StdRng> {
    pub fn new(sampling: SamplingConfig) -> Result<Self> {
        let rng = match sampling.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(sampling, rng)
    }
}

impl<R: Rng> Ingestor<R> {
    /// Create an ingestor drawing routing decisions from `rng`.
    pub fn with_rng(sampling: SamplingConfig, rng: R) -> Result<Self> {
        sampling.validate()?;
        Ok(Self {
            dictionary: Dictionary::default(),
            held_out: HeldOut::default(),
            withheld: HashMap::new(),
            sampling,
            rng,
        })
    }

    /// Ingest a dictionary file. A missing path is skipped with a warning.
    pub fn ingest_file(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            warn!("skipping {}: no such file", path.display());
            return Ok(0);
        }
        info!("processing {}", path.display());
        let file = File::open(path)?;
        self.ingest(&path.display().to_string(), BufReader::new(file))
    }

    /// Ingest `FORM<TAB>GLOSS[<TAB>FREQ[<TAB>...]]` rows. Returns the number of
    /// rows accepted. `source` only labels warnings.
    pub fn ingest<B: BufRead>(&mut self, source: &str, reader: B) -> Result<usize> {
        let mut accepted = 0;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if self.ingest_line(source, i + 1, &line) {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    fn ingest_line(&mut self, source: &str, lineno: usize, line: &str) -> bool {
        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        if fields.len() < 2 {
            return false;
        }
        let (form, gloss) = (fields[0], fields[1]);
        if form.is_empty() || gloss.is_empty() {
            warn!("{source}:{lineno}: empty form or gloss, row skipped");
            return false;
        }

        if self.route_to_held_out(form) {
            let gold = fields
                .get(self.sampling.gold_column)
                .filter(|g| !g.trim().is_empty())
                .copied()
                .unwrap_or(gloss);
            self.held_out.record(form.to_string(), gold.to_string());
            return true;
        }

        let frequency = match fields.get(2) {
            Some(raw) => parse_frequency(raw).unwrap_or_else(|| {
                warn!("{source}:{lineno}: cannot read frequency {raw:?}, using 1");
                1
            }),
            None => 1,
        };
        self.dictionary.record(Observation {
            form: form.to_string(),
            gloss: gloss.to_string(),
            frequency,
        });
        true
    }

    fn route_to_held_out(&mut self, form: &str) -> bool {
        if !self.sampling.is_active() {
            return false;
        }
        if let Some(&withheld) = self.withheld.get(form) {
            return withheld;
        }
        let withheld = self.rng.gen_bool(self.sampling.fraction);
        self.withheld.insert(form.to_string(), withheld);
        withheld
    }

    /// Finish ingestion. Fails if nothing is left to train on, or if
    /// evaluation is active and nothing was withheld.
    pub fn finish(self) -> Result<(Dictionary, HeldOut)> {
        if self.dictionary.is_empty() {
            return Err(GlossError::EmptyDictionary);
        }
        if self.sampling.is_active() && self.held_out.is_empty() {
            return Err(GlossError::EmptyHeldOut {
                fraction: self.sampling.fraction,
            });
        }
        info!(
            "registered {} forms ({} withheld)",
            self.dictionary.len(),
            self.held_out.len()
        );
        Ok((self.dictionary, self.held_out))
    }
}

/// Frequencies are positive integers; anything else is malformed.
fn parse_frequency(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|&f| f > 0)
}
