use serde::{Deserialize, Serialize};

use super::domain::{
    MismatchType, PackageTier, RecommendationInput, TimelineExpectation, WebsiteScope,
};

/// Closed set of input adjustments offered on the mismatch screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remedy {
    ReduceScope,
    AdjustBudget,
    ExtendTimeline,
    ReduceTimelineScope,
}

impl Remedy {
    pub const fn all() -> [Self; 4] {
        [
            Self::ReduceScope,
            Self::AdjustBudget,
            Self::ExtendTimeline,
            Self::ReduceTimelineScope,
        ]
    }

    /// Remedies worth offering for a mismatch, the one that clears it first.
    pub const fn suggested_for(mismatch: MismatchType) -> &'static [Self] {
        match mismatch {
            MismatchType::TimelineUnrealistic => &[Self::ExtendTimeline, Self::ReduceTimelineScope],
            MismatchType::ScopeTooLarge => &[Self::ReduceScope, Self::AdjustBudget],
            MismatchType::BudgetScope => &[Self::AdjustBudget, Self::ReduceScope],
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ReduceScope => "Reduce the website scope",
            Self::AdjustBudget => "Increase the budget",
            Self::ExtendTimeline => "Allow a more flexible timeline",
            Self::ReduceTimelineScope => "Launch a compact site first",
        }
    }
}

/// Apply a remedy to the input that produced `mismatch`.
///
/// Remedies only touch scope, budget and timeline; needs are never reduced.
pub fn resolve(
    input: &RecommendationInput,
    mismatch: MismatchType,
    remedy: Remedy,
) -> RecommendationInput {
    let mut next = input.clone();
    let tier = PackageTier::from_timing(input.marketing_timing);

    match remedy {
        Remedy::ReduceScope => {
            let target = match mismatch {
                MismatchType::ScopeTooLarge => tier.scope_ceiling(),
                MismatchType::TimelineUnrealistic => WebsiteScope::Standard,
                MismatchType::BudgetScope => WebsiteScope::Compact,
            };
            next.website_scope = next.website_scope.min(target);
        }
        Remedy::AdjustBudget => {
            next.budget_range = match input.budget_range.band() {
                Some(_) => input.budget_range.raised(),
                None => tier.max(input.website_scope.budget_demand()).matching_budget(),
            };
        }
        Remedy::ExtendTimeline => {
            next.timeline_expectation = TimelineExpectation::Patient;
            next.target_date = None;
        }
        Remedy::ReduceTimelineScope => {
            next.website_scope = WebsiteScope::Compact;
        }
    }

    next
}
