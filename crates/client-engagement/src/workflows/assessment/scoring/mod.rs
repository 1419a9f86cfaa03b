mod bands;
mod policy;
mod rules;

use super::domain::{MismatchType, RecommendationInput, RecommendationOutput};
use policy::{classify_mismatch, decide_confidence};
use tracing::debug;

/// Score a validated input. Pure and total: every well-formed input yields a package.
pub fn score(input: &RecommendationInput) -> RecommendationOutput {
    evaluate(input, None)
}

/// Score an input produced by a remedy for `prior`. Confidence stays low even when the
/// remedy cleared the mismatch.
pub fn rescore(input: &RecommendationInput, prior: MismatchType) -> RecommendationOutput {
    evaluate(input, Some(prior))
}

fn evaluate(input: &RecommendationInput, prior: Option<MismatchType>) -> RecommendationOutput {
    let signals = rules::extract_signals(input);
    let mismatch_type = classify_mismatch(&signals);
    let confidence_level = decide_confidence(&signals, mismatch_type, prior);
    let reasoning = rules::explain(input, &signals);

    let needs = input
        .needs
        .iter()
        .map(|need| need.label())
        .collect::<Vec<_>>()
        .join(",");
    let mut internal_notes = format!(
        "tier={:?}; budget={}; scope={}; timeline={}; current_state={}; needs={}",
        signals.tier,
        signals.budget.label(),
        signals.scope.label(),
        signals.timeline.label(),
        input.current_state.label(),
        needs
    );
    if let Some(prior) = prior {
        internal_notes.push_str(&format!("; resolved from {prior:?}"));
    }

    debug!(
        package = ?signals.tier,
        confidence = ?confidence_level,
        mismatch = ?mismatch_type,
        "scored recommendation input"
    );

    RecommendationOutput {
        recommended_package: signals.tier,
        confidence_level,
        confidence_percent: confidence_level.percentage(),
        budget_aligned: signals.budget_aligned,
        has_mismatch: mismatch_type.is_some(),
        mismatch_type,
        show_mismatch_screen: mismatch_type.is_some(),
        reasoning,
        internal_notes,
    }
}
