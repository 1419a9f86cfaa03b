use super::common::*;
use crate::workflows::assessment::domain::{
    BudgetRange, ConfidenceLevel, MarketingTiming, MismatchType, PackageTier,
    TimelineExpectation, WebsiteScope,
};
use crate::workflows::assessment::intake::{normalize, IntakeField, ValidationError};
use crate::workflows::assessment::resolver::{resolve, Remedy};
use crate::workflows::assessment::scoring::{rescore, score};

fn severity(mismatch: Option<MismatchType>) -> u8 {
    mismatch.map(MismatchType::severity).unwrap_or(0)
}

#[test]
fn scenario_a_small_foundation_site_is_high_confidence() {
    let input = normalize(&aligned_form()).expect("valid form");

    let output = score(&input);

    assert_eq!(output.recommended_package, PackageTier::Foundation);
    assert!(!output.has_mismatch);
    assert!(!output.show_mismatch_screen);
    assert!(output.budget_aligned);
    assert_eq!(output.confidence_level, ConfidenceLevel::High);
    assert_eq!(output.confidence_percent, 85);
}

#[test]
fn scenario_b_timeline_takes_priority() {
    let input = normalize(&conflicted_form()).expect("valid form");

    let output = score(&input);

    assert_eq!(output.recommended_package, PackageTier::Growth);
    assert!(output.has_mismatch);
    assert!(output.show_mismatch_screen);
    assert!(!output.budget_aligned);
    assert_eq!(output.mismatch_type, Some(MismatchType::TimelineUnrealistic));
    assert_eq!(output.confidence_level, ConfidenceLevel::Low);
}

#[test]
fn scenario_c_extending_timeline_drops_timeline_mismatch() {
    let input = normalize(&conflicted_form()).expect("valid form");

    let resolved = resolve(
        &input,
        MismatchType::TimelineUnrealistic,
        Remedy::ExtendTimeline,
    );
    let output = rescore(&resolved, MismatchType::TimelineUnrealistic);

    assert_eq!(resolved.timeline_expectation, TimelineExpectation::Patient);
    assert!(severity(output.mismatch_type) < MismatchType::TimelineUnrealistic.severity());
    assert_eq!(output.mismatch_type, Some(MismatchType::ScopeTooLarge));
}

#[test]
fn scenario_d_missing_target_date_is_the_only_error() {
    let mut form = aligned_form();
    form.timeline_expectation = Some("specific_date".to_string());

    let errors = normalize(&form).expect_err("target date missing");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.0[0].field(), IntakeField::TargetDate);
    assert_eq!(errors.0[0], ValidationError::MissingTargetDate);
}

#[test]
fn scenario_e_empty_needs_rejected() {
    let mut form = aligned_form();
    form.needs.clear();

    let errors = normalize(&form).expect_err("needs required");

    assert_eq!(errors.0, vec![ValidationError::NoNeeds]);
}

#[test]
fn marketing_timing_selects_the_package() {
    for (timing, tier) in [
        (MarketingTiming::FoundationFirst, PackageTier::Foundation),
        (MarketingTiming::Together, PackageTier::Growth),
        (MarketingTiming::Ongoing, PackageTier::Performance),
    ] {
        let output = score(&input(
            WebsiteScope::Standard,
            timing,
            BudgetRange::PerformanceBudget,
            TimelineExpectation::Patient,
        ));
        assert_eq!(output.recommended_package, tier);
    }
}

#[test]
fn one_band_over_budget_is_aligned() {
    let output = score(&input(
        WebsiteScope::Standard,
        MarketingTiming::FoundationFirst,
        BudgetRange::GrowthBudget,
        TimelineExpectation::Normal,
    ));

    assert!(output.budget_aligned);
    assert!(!output.has_mismatch);
    assert_eq!(output.confidence_level, ConfidenceLevel::High);
}

#[test]
fn two_bands_over_budget_is_borderline() {
    let output = score(&input(
        WebsiteScope::Standard,
        MarketingTiming::FoundationFirst,
        BudgetRange::PerformanceBudget,
        TimelineExpectation::Normal,
    ));

    assert!(!output.budget_aligned);
    assert!(!output.has_mismatch);
    assert_eq!(output.confidence_level, ConfidenceLevel::Medium);
    assert!(output.reasoning.budget_fit.contains("well above"));
}

#[test]
fn specific_date_caps_confidence_at_medium() {
    let mut candidate = input(
        WebsiteScope::Standard,
        MarketingTiming::FoundationFirst,
        BudgetRange::FoundationBudget,
        TimelineExpectation::SpecificDate,
    );
    candidate.target_date = chrono::NaiveDate::from_ymd_opt(2030, 1, 15);

    let output = score(&candidate);

    assert!(!output.has_mismatch);
    assert_eq!(output.confidence_level, ConfidenceLevel::Medium);
    assert!(output.reasoning.timeline_fit.contains("2030-01-15"));
}

#[test]
fn under_budget_is_a_budget_mismatch() {
    let output = score(&input(
        WebsiteScope::Comprehensive,
        MarketingTiming::Ongoing,
        BudgetRange::GrowthBudget,
        TimelineExpectation::Normal,
    ));

    assert!(!output.budget_aligned);
    assert_eq!(output.mismatch_type, Some(MismatchType::BudgetScope));
}

#[test]
fn unsure_budget_is_neutral_but_lowers_confidence() {
    let output = score(&input(
        WebsiteScope::Comprehensive,
        MarketingTiming::Together,
        BudgetRange::Unsure,
        TimelineExpectation::Normal,
    ));

    assert!(output.budget_aligned);
    assert!(!output.has_mismatch);
    assert_eq!(output.confidence_level, ConfidenceLevel::Medium);
    assert_eq!(output.confidence_percent, 60);
}

#[test]
fn two_borderline_signals_mean_low_confidence() {
    let mut candidate = input(
        WebsiteScope::Compact,
        MarketingTiming::Together,
        BudgetRange::Unsure,
        TimelineExpectation::SpecificDate,
    );
    candidate.target_date = chrono::NaiveDate::from_ymd_opt(2026, 4, 1);

    let output = score(&candidate);

    assert!(!output.has_mismatch);
    assert_eq!(output.confidence_level, ConfidenceLevel::Low);
    assert!(output.reasoning.timeline_fit.contains("2026-04-01"));
}

#[test]
fn asap_is_fine_for_a_small_foundation_build() {
    let output = score(&input(
        WebsiteScope::Standard,
        MarketingTiming::FoundationFirst,
        BudgetRange::FoundationBudget,
        TimelineExpectation::Asap,
    ));

    assert!(!output.has_mismatch);
}

#[test]
fn asap_with_growth_package_is_unrealistic() {
    let output = score(&input(
        WebsiteScope::Standard,
        MarketingTiming::Together,
        BudgetRange::GrowthBudget,
        TimelineExpectation::Asap,
    ));

    assert_eq!(output.mismatch_type, Some(MismatchType::TimelineUnrealistic));
}

#[test]
fn resolved_mismatch_keeps_confidence_low() {
    let clean = input(
        WebsiteScope::Compact,
        MarketingTiming::FoundationFirst,
        BudgetRange::FoundationBudget,
        TimelineExpectation::Patient,
    );

    let output = rescore(&clean, MismatchType::ScopeTooLarge);

    assert!(!output.has_mismatch);
    assert_eq!(output.confidence_level, ConfidenceLevel::Low);
    assert!(output.internal_notes.contains("resolved from ScopeTooLarge"));
}

#[test]
fn reasoning_is_filled_for_every_factor() {
    let output = score(&normalize(&conflicted_form()).expect("valid form"));

    assert!(output.reasoning.primary_factor.contains("Growth"));
    assert!(output.reasoning.budget_fit.contains("below"));
    assert!(output.reasoning.scope_fit.contains("extensive"));
    assert!(output.reasoning.timeline_fit.contains("not realistic"));
}

#[test]
fn scoring_is_deterministic_and_consistent() {
    for candidate in all_inputs() {
        let first = score(&candidate);
        let second = score(&candidate);
        assert_eq!(first, second);
        assert_eq!(first.has_mismatch, first.mismatch_type.is_some());
        assert_eq!(first.show_mismatch_screen, first.has_mismatch);
        assert_eq!(first.confidence_percent, first.confidence_level.percentage());
        assert!(PackageTier::ordered().contains(&first.recommended_package));
    }
}

#[test]
fn mismatch_never_scores_high() {
    for candidate in all_inputs() {
        let output = score(&candidate);
        if output.has_mismatch {
            assert_ne!(output.confidence_level, ConfidenceLevel::High, "{candidate:?}");
        }
    }
}

#[test]
fn fully_aligned_inputs_score_high() {
    for candidate in all_inputs() {
        let output = score(&candidate);
        let tier = output.recommended_package;
        let fully_aligned = !output.has_mismatch
            && output.budget_aligned
            && candidate.budget_range != BudgetRange::Unsure
            && candidate.timeline_expectation != TimelineExpectation::SpecificDate
            && candidate.website_scope >= tier.scope_floor();
        if fully_aligned {
            assert_eq!(output.confidence_level, ConfidenceLevel::High, "{candidate:?}");
        }
    }
}

#[test]
fn remedies_never_increase_severity() {
    for candidate in all_inputs() {
        let Some(mismatch) = score(&candidate).mismatch_type else {
            continue;
        };
        for remedy in Remedy::all() {
            let next = score(&resolve(&candidate, mismatch, remedy));
            assert!(
                severity(next.mismatch_type) <= mismatch.severity(),
                "{remedy:?} made {candidate:?} worse: {:?}",
                next.mismatch_type
            );
        }
    }
}

#[test]
fn suggested_remedy_eventually_clears_every_mismatch() {
    for candidate in all_inputs() {
        let mut current = candidate.clone();
        let mut rounds = 0;
        while let Some(mismatch) = score(&current).mismatch_type {
            assert!(rounds < 6, "mismatch never cleared for {candidate:?}");
            current = resolve(&current, mismatch, Remedy::suggested_for(mismatch)[0]);
            rounds += 1;
        }
        assert_eq!(current.needs, candidate.needs);
    }
}

#[test]
fn target_setting_remedies_are_idempotent() {
    for candidate in all_inputs() {
        let Some(mismatch) = score(&candidate).mismatch_type else {
            continue;
        };
        for remedy in [
            Remedy::ReduceScope,
            Remedy::ExtendTimeline,
            Remedy::ReduceTimelineScope,
        ] {
            let once = resolve(&candidate, mismatch, remedy);
            let twice = resolve(&once, mismatch, remedy);
            assert_eq!(once, twice, "{remedy:?} not idempotent");
            assert_eq!(rescore(&once, mismatch), rescore(&twice, mismatch));
        }
    }
}
