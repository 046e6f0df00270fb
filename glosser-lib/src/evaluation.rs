// Type-level evaluation over forms withheld from training.
//
// Each withheld (form, gold) pair is annotated as if it were an unseen query
// line `FORM<TAB>GOLD`. A field counts as correct when the gold gloss is one of
// its `|`-separated alternatives.

use log::info;

use crate::dictionary::HeldOut;
use crate::errors::Result;
use crate::pipeline::Pipeline;
use crate::types::{Annotation, Columns};

/// Correct/total counts for one output field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldScore {
    pub correct: usize,
    pub total: usize,
}

impl FieldScore {
    fn record(&mut self, predicted: &str, gold: &str) {
        self.total += 1;
        if contains_gold(predicted, gold) {
            self.correct += 1;
        }
    }

    /// `correct / total`, or 0 when nothing was scored.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Scores for the previous, left, right and merged fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalSummary {
    pub previous: FieldScore,
    pub left: FieldScore,
    pub right: FieldScore,
    pub merged: FieldScore,
}

impl EvalSummary {
    fn record(&mut self, columns: &Columns, gold: &str) {
        self.previous.record(&columns.previous, gold);
        self.left.record(&columns.left, gold);
        self.right.record(&columns.right, gold);
        self.merged.record(&columns.merged, gold);
    }
}

/// Whether `gold` is one of the `|`-separated alternatives in `predicted`.
///
/// Alternatives must match whole: `NOM` is not credited inside `NOM.SG`.
pub fn contains_gold(predicted: &str, gold: &str) -> bool {
    predicted.split('|').any(|p| p == gold)
}

/// Annotate every withheld pair, hand each annotation to `on_row`, and score
/// the four prediction fields.
pub fn evaluate<F>(pipeline: &mut Pipeline, held_out: &HeldOut, mut on_row: F) -> Result<EvalSummary>
where
    F: FnMut(&Annotation) -> Result<()>,
{
    info!("evaluating on {} withheld forms", held_out.len());
    let mut summary = EvalSummary::default();
    for (form, gold) in held_out.pairs() {
        let annotation = pipeline.annotate(&format!("{form}\t{gold}"));
        if let Some(columns) = &annotation.columns {
            summary.record(columns, gold);
        }
        on_row(&annotation)?;
    }
    info!(
        "merged accuracy {}/{}",
        summary.merged.correct, summary.merged.total
    );
    Ok(summary)
}
