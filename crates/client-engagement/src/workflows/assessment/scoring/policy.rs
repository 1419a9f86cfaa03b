use super::super::domain::{ConfidenceLevel, MismatchType};
use super::rules::{Fit, ScoreSignals};

/// Report the single most severe cause when several conditions fire.
pub(crate) fn classify_mismatch(signals: &ScoreSignals) -> Option<MismatchType> {
    [
        (signals.timeline, MismatchType::TimelineUnrealistic),
        (signals.scope, MismatchType::ScopeTooLarge),
        (signals.budget, MismatchType::BudgetScope),
    ]
    .into_iter()
    .filter(|(fit, _)| *fit == Fit::Conflict)
    .map(|(_, kind)| kind)
    .max_by_key(|kind| kind.severity())
}

/// A detected mismatch, even one resolved since, caps confidence at low.
pub(crate) fn decide_confidence(
    signals: &ScoreSignals,
    mismatch: Option<MismatchType>,
    prior_mismatch: Option<MismatchType>,
) -> ConfidenceLevel {
    if mismatch.is_some() || prior_mismatch.is_some() {
        return ConfidenceLevel::Low;
    }

    match signals.borderline_count() {
        0 => ConfidenceLevel::High,
        1 => ConfidenceLevel::Medium,
        _ => ConfidenceLevel::Low,
    }
}
