use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    BudgetRange, CurrentState, MarketingTiming, Need, RecommendationInput, TimelineExpectation,
    UnknownEnumValue, WebsiteScope,
};

/// Raw Tier 1 intake answers exactly as the form submits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeForm {
    #[serde(default)]
    pub current_state: Option<String>,
    #[serde(default)]
    pub needs: Vec<String>,
    #[serde(default)]
    pub website_scope: Option<String>,
    #[serde(default)]
    pub marketing_timing: Option<String>,
    #[serde(default)]
    pub budget_range: Option<String>,
    #[serde(default)]
    pub timeline_expectation: Option<String>,
    #[serde(default)]
    pub target_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeField {
    CurrentState,
    Needs,
    WebsiteScope,
    MarketingTiming,
    BudgetRange,
    TimelineExpectation,
    TargetDate,
}

impl fmt::Display for IntakeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntakeField::CurrentState => "current_state",
            IntakeField::Needs => "needs",
            IntakeField::WebsiteScope => "website_scope",
            IntakeField::MarketingTiming => "marketing_timing",
            IntakeField::BudgetRange => "budget_range",
            IntakeField::TimelineExpectation => "timeline_expectation",
            IntakeField::TargetDate => "target_date",
        };
        f.write_str(name)
    }
}

/// One problem with a submitted intake form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: IntakeField },
    #[error("{field} does not accept '{value}'")]
    Invalid { field: IntakeField, value: String },
    #[error("select at least one need")]
    NoNeeds,
    #[error("target_date is required when the timeline is a specific date")]
    MissingTargetDate,
    #[error("target_date '{value}' must be formatted as YYYY-MM-DD")]
    InvalidTargetDate { value: String },
}

impl ValidationError {
    pub fn field(&self) -> IntakeField {
        match self {
            ValidationError::Missing { field } | ValidationError::Invalid { field, .. } => *field,
            ValidationError::NoNeeds => IntakeField::Needs,
            ValidationError::MissingTargetDate | ValidationError::InvalidTargetDate { .. } => {
                IntakeField::TargetDate
            }
        }
    }
}

/// Every problem found in a form, so the UI can show them together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("intake form has {} problem(s): {}", .0.len(), summarize(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate and shape raw answers. Collects every error instead of stopping at the first.
pub fn normalize(form: &IntakeForm) -> Result<RecommendationInput, ValidationErrors> {
    let mut errors = Vec::new();

    let current_state: Option<CurrentState> =
        required(&form.current_state, IntakeField::CurrentState, &mut errors);
    let needs = collect_needs(&form.needs, &mut errors);
    let website_scope: Option<WebsiteScope> =
        required(&form.website_scope, IntakeField::WebsiteScope, &mut errors);
    let marketing_timing: Option<MarketingTiming> = required(
        &form.marketing_timing,
        IntakeField::MarketingTiming,
        &mut errors,
    );
    let budget_range: Option<BudgetRange> =
        required(&form.budget_range, IntakeField::BudgetRange, &mut errors);
    let timeline_expectation: Option<TimelineExpectation> = required(
        &form.timeline_expectation,
        IntakeField::TimelineExpectation,
        &mut errors,
    );

    // A date only means something for the date-specific timeline; otherwise it is dropped.
    let target_date = match timeline_expectation {
        Some(TimelineExpectation::SpecificDate) => match present(&form.target_date) {
            None => {
                errors.push(ValidationError::MissingTargetDate);
                None
            }
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(ValidationError::InvalidTargetDate {
                        value: raw.to_string(),
                    });
                    None
                }
            },
        },
        _ => None,
    };

    match (
        current_state,
        website_scope,
        marketing_timing,
        budget_range,
        timeline_expectation,
    ) {
        (
            Some(current_state),
            Some(website_scope),
            Some(marketing_timing),
            Some(budget_range),
            Some(timeline_expectation),
        ) if errors.is_empty() => Ok(RecommendationInput {
            current_state,
            needs,
            website_scope,
            marketing_timing,
            budget_range,
            timeline_expectation,
            target_date,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

impl RecommendationInput {
    /// Re-check the shape guarantees `normalize` gives, for inputs that arrive
    /// already typed (e.g. inside a posted workflow snapshot).
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        if self.needs.is_empty() {
            errors.push(ValidationError::NoNeeds);
        }
        if self.timeline_expectation == TimelineExpectation::SpecificDate
            && self.target_date.is_none()
        {
            errors.push(ValidationError::MissingTargetDate);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}

fn required<T>(
    value: &Option<String>,
    field: IntakeField,
    errors: &mut Vec<ValidationError>,
) -> Option<T>
where
    T: FromStr<Err = UnknownEnumValue>,
{
    let Some(raw) = present(value) else {
        errors.push(ValidationError::Missing { field });
        return None;
    };

    match raw.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(unknown) => {
            errors.push(ValidationError::Invalid {
                field,
                value: unknown.value,
            });
            None
        }
    }
}

fn collect_needs(raw: &[String], errors: &mut Vec<ValidationError>) -> BTreeSet<Need> {
    let mut needs = BTreeSet::new();
    let mut seen_any = false;

    for entry in raw.iter().map(|value| value.trim()).filter(|v| !v.is_empty()) {
        seen_any = true;
        match entry.parse::<Need>() {
            Ok(need) => {
                needs.insert(need);
            }
            Err(unknown) => errors.push(ValidationError::Invalid {
                field: IntakeField::Needs,
                value: unknown.value,
            }),
        }
    }

    if !seen_any {
        errors.push(ValidationError::NoNeeds);
    }

    needs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> IntakeForm {
        IntakeForm {
            current_state: Some("basics".to_string()),
            needs: vec!["website".to_string(), "brand".to_string()],
            website_scope: Some("compact".to_string()),
            marketing_timing: Some("foundation_first".to_string()),
            budget_range: Some("foundation_budget".to_string()),
            timeline_expectation: Some("normal".to_string()),
            target_date: None,
        }
    }

    #[test]
    fn normalizes_complete_form() {
        let input = normalize(&complete_form()).expect("form is valid");

        assert_eq!(input.current_state, CurrentState::Basics);
        assert_eq!(input.website_scope, WebsiteScope::Compact);
        assert!(input.needs.contains(&Need::Website));
        assert!(input.needs.contains(&Need::Brand));
        assert!(input.target_date.is_none());
    }

    #[test]
    fn collects_every_missing_field() {
        let form = IntakeForm::default();

        let errors = normalize(&form).expect_err("empty form is rejected");

        assert_eq!(errors.len(), 6);
        assert!(errors.iter().any(|e| *e == ValidationError::NoNeeds));
        assert!(errors.iter().any(|e| *e
            == ValidationError::Missing {
                field: IntakeField::TimelineExpectation
            }));
    }

    #[test]
    fn rejects_out_of_vocabulary_values() {
        let mut form = complete_form();
        form.website_scope = Some("gigantic".to_string());
        form.needs.push("time_travel".to_string());

        let errors = normalize(&form).expect_err("unknown values are rejected");

        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::Invalid { field: IntakeField::WebsiteScope, value } if value == "gigantic"
        )));
        assert!(errors
            .iter()
            .any(|e| e.field() == IntakeField::Needs));
    }

    #[test]
    fn specific_date_requires_target_date() {
        let mut form = complete_form();
        form.timeline_expectation = Some("specific_date".to_string());

        let errors = normalize(&form).expect_err("target date required");

        assert_eq!(errors.0, vec![ValidationError::MissingTargetDate]);
    }

    #[test]
    fn specific_date_parses_target_date() {
        let mut form = complete_form();
        form.timeline_expectation = Some("specific_date".to_string());
        form.target_date = Some("2026-03-01".to_string());

        let input = normalize(&form).expect("form is valid");

        assert_eq!(
            input.target_date,
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
    }

    #[test]
    fn reports_malformed_target_date() {
        let mut form = complete_form();
        form.timeline_expectation = Some("specific_date".to_string());
        form.target_date = Some("next spring".to_string());

        let errors = normalize(&form).expect_err("bad date");

        assert!(matches!(
            errors.0.as_slice(),
            [ValidationError::InvalidTargetDate { .. }]
        ));
    }

    #[test]
    fn drops_target_date_for_other_timelines() {
        let mut form = complete_form();
        form.target_date = Some("2026-03-01".to_string());

        let input = normalize(&form).expect("form is valid");

        assert!(input.target_date.is_none());
    }

    #[test]
    fn accepts_numeric_budget_tiers() {
        let mut form = complete_form();
        form.budget_range = Some("2".to_string());

        let input = normalize(&form).expect("numeric tier accepted");

        assert_eq!(input.budget_range, BudgetRange::GrowthBudget);
    }

    #[test]
    fn duplicate_needs_collapse() {
        let mut form = complete_form();
        form.needs = vec!["Website".to_string(), "website".to_string()];

        let input = normalize(&form).expect("form is valid");

        assert_eq!(input.needs.len(), 1);
    }

    #[test]
    fn blank_needs_count_as_none_selected() {
        let mut form = complete_form();
        form.needs = vec!["  ".to_string()];

        let errors = normalize(&form).expect_err("needs required");

        assert_eq!(errors.0, vec![ValidationError::NoNeeds]);
    }

    #[test]
    fn typed_input_is_revalidated() {
        let mut input = normalize(&complete_form()).expect("form is valid");
        assert!(input.validate().is_ok());

        input.needs.clear();
        input.timeline_expectation = TimelineExpectation::SpecificDate;
        input.target_date = None;

        let errors = input.validate().expect_err("shape guarantees broken");
        assert_eq!(
            errors.0,
            vec![ValidationError::NoNeeds, ValidationError::MissingTargetDate]
        );
    }
}
