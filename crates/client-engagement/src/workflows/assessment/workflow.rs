use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{
    AssessmentId, EngagementId, MismatchType, RecommendationInput, RecommendationOutput,
};
use super::intake::{normalize, IntakeForm, ValidationError, ValidationErrors};
use super::resolver::{resolve, Remedy};
use super::scoring::{rescore, score};

/// Screens of the Tier 1 assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Form,
    Recommendation,
    Mismatch,
    Complete,
}

impl WorkflowStage {
    pub const fn label(self) -> &'static str {
        match self {
            WorkflowStage::Form => "form",
            WorkflowStage::Recommendation => "recommendation",
            WorkflowStage::Mismatch => "mismatch",
            WorkflowStage::Complete => "complete",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised while moving between screens.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("cannot {action} while on the {from} screen")]
    InvalidTransition {
        from: WorkflowStage,
        action: &'static str,
    },
    #[error("mismatch still unresolved after {attempts} attempt(s); starting over")]
    ResolutionLimitReached { attempts: u8 },
    #[error("recommendation still has an unresolved mismatch: {0:?}")]
    UnresolvedMismatch(MismatchType),
}

/// One assessment attempt for an engagement: form → recommendation | mismatch → complete.
///
/// The snapshot is serializable so a client can hold it between requests; every
/// transition re-scores from the input rather than trusting a stored output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentWorkflow {
    engagement_id: EngagementId,
    stage: WorkflowStage,
    #[serde(default)]
    input: Option<RecommendationInput>,
    #[serde(default)]
    recommendation: Option<RecommendationOutput>,
    #[serde(default)]
    validation_errors: Vec<ValidationError>,
    #[serde(default)]
    resolution_attempts: u8,
    #[serde(default)]
    detected_mismatch: Option<MismatchType>,
    #[serde(default)]
    assessment_id: Option<AssessmentId>,
}

impl AssessmentWorkflow {
    pub fn new(engagement_id: EngagementId) -> Self {
        Self {
            engagement_id,
            stage: WorkflowStage::Form,
            input: None,
            recommendation: None,
            validation_errors: Vec::new(),
            resolution_attempts: 0,
            detected_mismatch: None,
            assessment_id: None,
        }
    }

    pub fn engagement_id(&self) -> &EngagementId {
        &self.engagement_id
    }

    pub fn stage(&self) -> WorkflowStage {
        self.stage
    }

    pub fn input(&self) -> Option<&RecommendationInput> {
        self.input.as_ref()
    }

    pub fn recommendation(&self) -> Option<&RecommendationOutput> {
        self.recommendation.as_ref()
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.validation_errors
    }

    pub fn resolution_attempts(&self) -> u8 {
        self.resolution_attempts
    }

    pub fn assessment_id(&self) -> Option<&AssessmentId> {
        self.assessment_id.as_ref()
    }

    /// First mismatch detected in this attempt, if any.
    pub fn detected_mismatch(&self) -> Option<MismatchType> {
        self.detected_mismatch
    }

    pub fn mismatch_resolved(&self) -> bool {
        self.detected_mismatch.is_some()
            && matches!(
                self.stage,
                WorkflowStage::Recommendation | WorkflowStage::Complete
            )
    }

    /// Submit the intake form. Validation errors keep the workflow on the form.
    pub fn submit(&mut self, form: &IntakeForm) -> Result<&RecommendationOutput, WorkflowError> {
        self.expect_stage(WorkflowStage::Form, "submit the intake form")?;

        let input = match normalize(form) {
            Ok(input) => input,
            Err(errors) => {
                self.validation_errors = errors.0.clone();
                return Err(WorkflowError::Validation(errors));
            }
        };

        let output = score(&input);
        self.validation_errors.clear();
        self.resolution_attempts = 0;
        self.detected_mismatch = output.mismatch_type;
        self.stage = if output.show_mismatch_screen {
            WorkflowStage::Mismatch
        } else {
            WorkflowStage::Recommendation
        };
        self.input = Some(input);

        Ok(self.recommendation.insert(output))
    }

    /// Apply a remedy on the mismatch screen and re-score.
    ///
    /// Stays on the mismatch screen while the mismatch persists; once `max_attempts`
    /// remedies have failed the workflow returns to the form.
    pub fn apply_remedy(
        &mut self,
        remedy: Remedy,
        max_attempts: u8,
    ) -> Result<&RecommendationOutput, WorkflowError> {
        self.expect_stage(WorkflowStage::Mismatch, "apply a remedy")?;
        let input = self.input.clone().ok_or(WorkflowError::InvalidTransition {
            from: self.stage,
            action: "apply a remedy without an assessed input",
        })?;
        input.validate()?;

        let current = match score(&input).mismatch_type {
            Some(current) => current,
            None => {
                let output = self.rescore_for(&input);
                self.stage = WorkflowStage::Recommendation;
                return Ok(self.recommendation.insert(output));
            }
        };
        let prior = *self.detected_mismatch.get_or_insert(current);

        let next = resolve(&input, current, remedy);
        let output = rescore(&next, prior);
        self.resolution_attempts = self.resolution_attempts.saturating_add(1);

        if output.show_mismatch_screen && self.resolution_attempts >= max_attempts.max(1) {
            let attempts = self.resolution_attempts;
            self.reset();
            return Err(WorkflowError::ResolutionLimitReached { attempts });
        }

        self.stage = if output.show_mismatch_screen {
            WorkflowStage::Mismatch
        } else {
            WorkflowStage::Recommendation
        };
        self.input = Some(next);

        Ok(self.recommendation.insert(output))
    }

    /// Abandon the current answers and return to an empty form.
    pub fn start_over(&mut self) -> Result<(), WorkflowError> {
        if self.stage == WorkflowStage::Complete {
            return Err(WorkflowError::InvalidTransition {
                from: self.stage,
                action: "start over",
            });
        }
        self.reset();
        Ok(())
    }

    /// Input and freshly computed output the user is about to accept.
    pub(crate) fn acceptance(
        &self,
    ) -> Result<(RecommendationInput, RecommendationOutput), WorkflowError> {
        self.expect_stage(WorkflowStage::Recommendation, "accept the recommendation")?;
        let input = self.input.clone().ok_or(WorkflowError::InvalidTransition {
            from: self.stage,
            action: "accept without an assessed input",
        })?;
        input.validate()?;

        let output = self.rescore_for(&input);
        if let Some(mismatch) = output.mismatch_type {
            return Err(WorkflowError::UnresolvedMismatch(mismatch));
        }

        Ok((input, output))
    }

    pub(crate) fn complete(&mut self, assessment_id: AssessmentId, output: RecommendationOutput) {
        self.stage = WorkflowStage::Complete;
        self.assessment_id = Some(assessment_id);
        self.recommendation = Some(output);
    }

    fn rescore_for(&self, input: &RecommendationInput) -> RecommendationOutput {
        match self.detected_mismatch {
            Some(prior) => rescore(input, prior),
            None => score(input),
        }
    }

    fn expect_stage(&self, expected: WorkflowStage, action: &'static str) -> Result<(), WorkflowError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                from: self.stage,
                action,
            })
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.engagement_id.clone());
    }
}
