//! Category and overall score aggregation.

use definitie_core::Category;

use crate::result::{CategoryScore, RuleResult};
use crate::schema::Thresholds;

/// Overall score and verdict for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub overall_score: f64,
    pub is_acceptable: bool,
    pub rejection_reasons: Vec<String>,
}

/// Round to 2 decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate the results of one category.
///
/// The score is the arithmetic mean over scored (non-advisory) rules, with
/// errored rules counting as 0. A category without scored rules is vacuous
/// and scores 1.0. Rule code lists are sorted.
pub fn aggregate_category(category: Category, weight: f64, results: &[&RuleResult]) -> CategoryScore {
    let scored: Vec<f64> = results
        .iter()
        .filter(|r| !r.advisory)
        .map(|r| if r.errored { 0.0 } else { r.score })
        .collect();
    let vacuous = scored.is_empty();
    let score = if vacuous {
        1.0
    } else {
        scored.iter().sum::<f64>() / scored.len() as f64
    };

    let codes = |pred: fn(&RuleResult) -> bool| {
        let mut codes: Vec<String> = results
            .iter()
            .filter(|r| pred(r))
            .map(|r| r.code.clone())
            .collect();
        codes.sort();
        codes
    };

    CategoryScore {
        category,
        score,
        weight,
        vacuous,
        passed_rules: codes(|r| r.passed),
        violated_rules: codes(RuleResult::is_violation),
        errored_rules: codes(|r| r.errored),
    }
}

/// Weighted mean `Σ(w·s) / Σw` over `(weight, score)` pairs, rounded to 2
/// decimals. Returns exactly 0.0 when the weights sum to zero.
pub fn weighted_score(pairs: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let (weighted, total) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(ws, w), (weight, score)| (ws + weight * score, w + weight));
    if total == 0.0 {
        return 0.0;
    }
    round2(weighted / total)
}

/// Combine category scores into the overall score and verdict.
///
/// Vacuous categories are left out of the weighting. A non-vacuous category
/// scoring below its configured minimum rejects the definition even when the
/// overall score clears the threshold.
pub fn aggregate_overall(category_scores: &[CategoryScore], thresholds: &Thresholds) -> Verdict {
    let overall_score = weighted_score(
        category_scores
            .iter()
            .filter(|c| !c.vacuous)
            .map(|c| (c.weight, c.score)),
    );

    let mut rejection_reasons = Vec::new();
    if overall_score < thresholds.overall {
        rejection_reasons.push(format!(
            "overall score {:.2} is below threshold {:.2}",
            overall_score, thresholds.overall
        ));
    }
    for c in category_scores.iter().filter(|c| !c.vacuous) {
        if let Some(minimum) = thresholds.minimum(c.category) {
            if c.score < minimum {
                rejection_reasons.push(format!(
                    "{} score {:.2} is below minimum {:.2}",
                    c.category, c.score, minimum
                ));
            }
        }
    }

    Verdict {
        overall_score,
        is_acceptable: rejection_reasons.is_empty(),
        rejection_reasons,
    }
}
