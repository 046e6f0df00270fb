// Output formatting for annotations and evaluation summaries.

use crate::evaluation::EvalSummary;
use crate::types::{Annotation, CandidateSet, ABSENT};

/// Join candidates with `|` in sorted order; `_` when there are none.
pub fn join_candidates(candidates: &CandidateSet) -> String {
    if candidates.is_empty() {
        return ABSENT.to_string();
    }
    candidates
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("|")
}

/// Render an annotation as the input line followed by
/// `BASE, CODE, PREV, LEFT, RIGHT, MERGED`, tab-separated.
/// Comment and blank lines come back unchanged.
pub fn to_tsv(a: &Annotation) -> String {
    match &a.columns {
        Some(c) => format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            a.line, c.base, c.code, c.previous, c.left, c.right, c.merged
        ),
        None => a.line.clone(),
    }
}

/// Format `value` keeping `digits` significant digits, truncating the rest.
/// Zero is printed with `digits - 1` decimals, like 1.
pub fn truncate_significant(value: f64, digits: u32) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    if value == 0.0 {
        return format!("{:.prec$}", 0.0, prec = digits.saturating_sub(1) as usize);
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits as i32 - 1 - magnitude).max(0);
    let scale = 10f64.powi(decimals);
    // Nudge before truncating so that e.g. 0.29 does not print as 0.2899.
    let truncated = (value * scale + value.signum() * 1e-9).trunc() / scale;
    format!("{truncated:.prec$}", prec = decimals as usize)
}

/// Significant digits kept in the evaluation summary.
pub const SUMMARY_DIGITS: u32 = 4;

/// One line with the previous, left, right and merged type accuracies.
pub fn format_summary(summary: &EvalSummary) -> String {
    [
        &summary.previous,
        &summary.left,
        &summary.right,
        &summary.merged,
    ]
    .iter()
    .map(|score| truncate_significant(score.accuracy(), SUMMARY_DIGITS))
    .collect::<Vec<_>>()
    .join("\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::FieldScore;
    use crate::types::Columns;

    #[test]
    fn test_join_candidates() {
        assert_eq!(join_candidates(&CandidateSet::new()), "_");
        let set: CandidateSet = ["NOM", "GEN"].iter().map(|s| s.to_string()).collect();
        assert_eq!(join_candidates(&set), "GEN|NOM");
    }

    #[test]
    fn test_tsv_rows() {
        let passthrough = Annotation {
            line: "# comment".to_string(),
            form: None,
            columns: None,
        };
        assert_eq!(to_tsv(&passthrough), "# comment");

        let annotated = Annotation {
            line: "mu".to_string(),
            form: Some("mu".to_string()),
            columns: Some(Columns {
                base: "NOM.SG".to_string(),
                code: "D".to_string(),
                previous: "NOM.SG".to_string(),
                left: "_".to_string(),
                right: "_".to_string(),
                merged: "NOM.SG".to_string(),
            }),
        };
        assert_eq!(to_tsv(&annotated), "mu\tNOM.SG\tD\tNOM.SG\t_\t_\tNOM.SG");
    }

    #[test]
    fn test_truncate_significant() {
        assert_eq!(truncate_significant(0.123456, 4), "0.1234");
        assert_eq!(truncate_significant(2.0 / 3.0, 4), "0.6666");
        assert_eq!(truncate_significant(0.29, 4), "0.2900");
        assert_eq!(truncate_significant(1.0, 4), "1.000");
        assert_eq!(truncate_significant(0.0, 4), "0.000");
        assert_eq!(truncate_significant(0.0, 1), "0");
    }

    #[test]
    fn test_format_summary() {
        let summary = EvalSummary {
            previous: FieldScore { correct: 0, total: 3 },
            left: FieldScore { correct: 1, total: 3 },
            right: FieldScore { correct: 2, total: 3 },
            merged: FieldScore { correct: 3, total: 3 },
        };
        assert_eq!(format_summary(&summary), "0.000\t0.3333\t0.6666\t1.000");
    }
}
