//! Human-readable rendering of validation results.

use std::fmt::Write;

use crate::batch::{BatchItemReport, BatchReport};
use crate::result::ValidationResult;

/// Render one result as a multi-line text block.
pub fn render_result(result: &ValidationResult) -> String {
    let mut out = String::new();
    let verdict = if result.is_acceptable { "ACCEPTED" } else { "REJECTED" };
    let _ = writeln!(
        out,
        "{} '{}': score {:.2} (threshold {:.2})",
        verdict, result.term, result.overall_score, result.threshold
    );

    if let Some(degraded) = &result.degraded {
        let _ = writeln!(out, "  degraded: {}", degraded.reasons.join("; "));
    }

    for c in &result.category_scores {
        if c.vacuous {
            let _ = writeln!(out, "  {:<12} -    (no scored rules)", c.category);
        } else {
            let _ = writeln!(
                out,
                "  {:<12} {:.2} x{} ({} passed, {} violated, {} errored)",
                c.category,
                c.score,
                c.weight,
                c.passed_rules.len(),
                c.violated_rules.len(),
                c.errored_rules.len()
            );
        }
    }

    for v in &result.violations {
        let marker = if v.advisory { " (advisory)" } else { "" };
        let _ = writeln!(out, "  x {}{}: {}", v.code, marker, v.message);
    }
    for e in &result.errored_rules {
        let _ = writeln!(out, "  ! {}: {}: {}", e.code, e.error.kind, e.error.message);
    }
    for reason in &result.rejection_reasons {
        let _ = writeln!(out, "  - {}", reason);
    }
    out
}

fn render_item(out: &mut String, item: &BatchItemReport) {
    let _ = write!(out, "[{}] ", item.index);
    match (&item.result, &item.input_error) {
        (Some(result), _) => out.push_str(&render_result(result)),
        (None, Some(error)) => {
            let _ = writeln!(out, "ERRORED: {}", error);
        }
        (None, None) => {
            let _ = writeln!(out, "ABANDONED in state {:?}", item.state);
        }
    }
}

/// Render a batch report: one block per item, then a summary line.
pub fn render_batch(report: &BatchReport) -> String {
    let mut out = String::new();
    for item in &report.items {
        render_item(&mut out, item);
    }

    let accepted = report
        .results()
        .flatten()
        .filter(|r| r.is_acceptable)
        .count();
    let _ = writeln!(
        out,
        "{} item(s): {} accepted, {} rejected, {} errored, {} abandoned{}",
        report.items.len(),
        accepted,
        report.completed() - accepted,
        report.errored(),
        report.abandoned(),
        if report.partial { " (partial)" } else { "" }
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ItemState;
    use crate::catalog::DegradedMode;
    use crate::result::{CategoryScore, Violation, RESULT_VERSION};
    use definitie_core::{Category, InputError};

    fn result() -> ValidationResult {
        ValidationResult {
            version: RESULT_VERSION.to_string(),
            term: "Contract".into(),
            overall_score: 0.65,
            is_acceptable: false,
            threshold: 0.75,
            category_scores: vec![
                CategoryScore {
                    category: Category::Circularity,
                    score: 0.5,
                    weight: 3.0,
                    vacuous: false,
                    passed_rules: vec!["CIRC-02".into()],
                    violated_rules: vec!["CIRC-01".into()],
                    errored_rules: vec![],
                },
                CategoryScore {
                    category: Category::Coherence,
                    score: 1.0,
                    weight: 1.0,
                    vacuous: true,
                    passed_rules: vec![],
                    violated_rules: vec![],
                    errored_rules: vec![],
                },
            ],
            violations: vec![Violation {
                code: "CIRC-01".into(),
                category: Category::Circularity,
                message: "definition repeats the term 'Contract'".into(),
                advisory: false,
            }],
            passed_rules: vec!["CIRC-02".into()],
            errored_rules: vec![],
            rule_results: vec![],
            rejection_reasons: vec!["overall score 0.65 is below threshold 0.75".into()],
            degraded: Some(DegradedMode {
                failed_sources: vec!["broken.yml".into()],
                reasons: vec!["1 rule source(s) failed to load".into()],
            }),
            correlation_id: "req-1".into(),
        }
    }

    #[test]
    fn result_block_lists_scores_violations_and_reasons() {
        let text = render_result(&result());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "REJECTED 'Contract': score 0.65 (threshold 0.75)");
        assert_eq!(lines[1], "  degraded: 1 rule source(s) failed to load");
        assert!(lines[2].starts_with("  circularity  0.50 x3"));
        assert!(lines[3].contains("(no scored rules)"));
        assert_eq!(lines[4], "  x CIRC-01: definition repeats the term 'Contract'");
        assert_eq!(lines[5], "  - overall score 0.65 is below threshold 0.75");
    }

    #[test]
    fn batch_summary_counts_outcomes() {
        let report = BatchReport {
            items: vec![
                BatchItemReport {
                    index: 0,
                    state: ItemState::Done,
                    result: Some(result()),
                    input_error: None,
                },
                BatchItemReport {
                    index: 1,
                    state: ItemState::Errored,
                    result: None,
                    input_error: Some(InputError::EmptyText),
                },
                BatchItemReport {
                    index: 2,
                    state: ItemState::RulesEvaluating,
                    result: None,
                    input_error: None,
                },
            ],
            partial: true,
            catalog_generation: 1,
        };
        let text = render_batch(&report);
        assert!(text.contains("[1] ERRORED: definition text must not be empty or blank"));
        assert!(text.contains("[2] ABANDONED in state RulesEvaluating"));
        assert!(text.ends_with(
            "3 item(s): 0 accepted, 1 rejected, 1 errored, 1 abandoned (partial)\n"
        ));
    }
}
