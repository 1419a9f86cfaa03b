use super::super::domain::{
    BudgetRange, PackageTier, Reasoning, RecommendationInput, TimelineExpectation,
};

/// How one signal relates to the selected package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fit {
    Aligned,
    Borderline,
    Conflict,
}

impl Fit {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Fit::Aligned => "aligned",
            Fit::Borderline => "borderline",
            Fit::Conflict => "conflict",
        }
    }
}

pub(crate) struct ScoreSignals {
    pub tier: PackageTier,
    pub budget: Fit,
    pub budget_aligned: bool,
    pub scope: Fit,
    pub timeline: Fit,
}

impl ScoreSignals {
    pub(crate) fn borderline_count(&self) -> usize {
        [self.budget, self.scope, self.timeline]
            .into_iter()
            .filter(|fit| *fit == Fit::Borderline)
            .count()
    }
}

pub(crate) fn extract_signals(input: &RecommendationInput) -> ScoreSignals {
    let tier = PackageTier::from_timing(input.marketing_timing);

    let (budget, budget_aligned) = match input.budget_range.band() {
        None => (Fit::Borderline, true),
        Some(band) if band < tier => (Fit::Conflict, false),
        Some(band) if band < input.website_scope.budget_demand() => (Fit::Conflict, true),
        // Aligned covers the package band and the one directly above it.
        Some(band) if band.bands_above(tier) > 1 => (Fit::Borderline, false),
        Some(_) => (Fit::Aligned, true),
    };

    let scope = if input.website_scope > tier.scope_ceiling() {
        Fit::Conflict
    } else if input.website_scope < tier.scope_floor() {
        Fit::Borderline
    } else {
        Fit::Aligned
    };

    let timeline = match input.timeline_expectation {
        TimelineExpectation::Asap
            if input.website_scope.is_large() || tier > PackageTier::Foundation =>
        {
            Fit::Conflict
        }
        TimelineExpectation::SpecificDate => Fit::Borderline,
        _ => Fit::Aligned,
    };

    ScoreSignals {
        tier,
        budget,
        budget_aligned,
        scope,
        timeline,
    }
}

pub(crate) fn explain(input: &RecommendationInput, signals: &ScoreSignals) -> Reasoning {
    let tier = signals.tier;

    let primary_factor = format!(
        "You chose '{}', which points to the {} package.",
        input.marketing_timing.label(),
        tier.label()
    );

    let budget_fit = match (signals.budget, input.budget_range) {
        (_, BudgetRange::Unsure) => format!(
            "No budget chosen yet; {} typically calls for an {}.",
            tier.label(),
            tier.budget_band_label()
        ),
        (Fit::Conflict, budget) if !signals.budget_aligned => format!(
            "A {} sits below the {} the {} package requires.",
            budget.label(),
            tier.budget_band_label(),
            tier.label()
        ),
        (Fit::Conflict, budget) => format!(
            "A {} covers the {} package but not a {} website.",
            budget.label(),
            tier.label(),
            input.website_scope.label()
        ),
        (Fit::Borderline, budget) => format!(
            "A {} is well above the {} the {} package usually needs.",
            budget.label(),
            tier.budget_band_label(),
            tier.label()
        ),
        (_, budget) => format!(
            "A {} fits the {} package.",
            budget.label(),
            tier.label()
        ),
    };

    let scope_fit = match signals.scope {
        Fit::Conflict => format!(
            "A {} website is larger than {} delivers (up to {}).",
            input.website_scope.label(),
            tier.label(),
            tier.scope_ceiling().label()
        ),
        Fit::Borderline => format!(
            "A {} website is on the small side for {}.",
            input.website_scope.label(),
            tier.label()
        ),
        Fit::Aligned => format!(
            "A {} website fits within {}.",
            input.website_scope.label(),
            tier.label()
        ),
    };

    let timeline_fit = match (signals.timeline, input.target_date) {
        (Fit::Conflict, _) => format!(
            "'{}' is not realistic for a {} {} build.",
            input.timeline_expectation.label(),
            input.website_scope.label(),
            tier.label()
        ),
        (Fit::Borderline, Some(date)) => format!(
            "A fixed launch date of {date} leaves little room for change."
        ),
        (Fit::Borderline, None) => "A fixed launch date leaves little room for change.".to_string(),
        (Fit::Aligned, _) => format!(
            "'{}' works for this scope.",
            input.timeline_expectation.label()
        ),
    };

    Reasoning {
        primary_factor,
        budget_fit,
        scope_fit,
        timeline_fit,
    }
}
