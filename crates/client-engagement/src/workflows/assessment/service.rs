use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{error, info, warn};

use super::domain::{EngagementId, RecommendationOutput};
use super::intake::IntakeForm;
use super::resolver::Remedy;
use super::store::{
    AssessmentNotification, AssessmentRecord, AssessmentSnapshot, EngagementStatus,
    EngagementStore, EngagementUpdate, Notifier, StoreError,
};
use super::workflow::{AssessmentWorkflow, WorkflowError};
use crate::config::AssessmentConfig;

/// Drives assessment workflows against an injected record store and notifier.
///
/// The service keeps the authoritative copy of each engagement's open attempt.
/// A snapshot posted back by a client must match it (or be a fresh, empty
/// attempt) before any transition runs.
pub struct AssessmentService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    config: AssessmentConfig,
    sessions: Mutex<HashMap<EngagementId, AssessmentWorkflow>>,
}

impl<S, N> AssessmentService<S, N>
where
    S: EngagementStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: AssessmentConfig) -> Self {
        Self {
            store,
            notifier,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    /// Start a fresh attempt for an existing engagement.
    pub fn begin(
        &self,
        engagement_id: &EngagementId,
    ) -> Result<AssessmentWorkflow, AssessmentServiceError> {
        self.store
            .get_engagement(engagement_id)?
            .ok_or_else(|| AssessmentServiceError::EngagementNotFound(engagement_id.clone()))?;
        Ok(AssessmentWorkflow::new(engagement_id.clone()))
    }

    pub fn submit(
        &self,
        workflow: &mut AssessmentWorkflow,
        form: &IntakeForm,
    ) -> Result<RecommendationOutput, AssessmentServiceError> {
        self.transition(workflow, |workflow| Ok(workflow.submit(form)?.clone()))
    }

    pub fn apply_remedy(
        &self,
        workflow: &mut AssessmentWorkflow,
        remedy: Remedy,
    ) -> Result<RecommendationOutput, AssessmentServiceError> {
        let max_attempts = self.config.max_resolution_attempts;
        self.transition(workflow, |workflow| {
            Ok(workflow.apply_remedy(remedy, max_attempts)?.clone())
        })
    }

    pub fn start_over(
        &self,
        workflow: &mut AssessmentWorkflow,
    ) -> Result<(), AssessmentServiceError> {
        self.transition(workflow, |workflow| Ok(workflow.start_over()?))
    }

    /// Persist the accepted recommendation, sync the engagement, then notify.
    ///
    /// Any store failure leaves the workflow on the recommendation screen so the
    /// user can retry without re-answering the form.
    pub fn accept(
        &self,
        workflow: &mut AssessmentWorkflow,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        self.transition(workflow, |workflow| self.persist_acceptance(workflow))
    }

    fn persist_acceptance(
        &self,
        workflow: &mut AssessmentWorkflow,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let (input, output) = workflow.acceptance()?;
        let engagement_id = workflow.engagement_id().clone();

        let engagement = self
            .store
            .get_engagement(&engagement_id)?
            .ok_or_else(|| AssessmentServiceError::EngagementNotFound(engagement_id.clone()))?;

        let now = Utc::now();
        let snapshot = AssessmentSnapshot {
            engagement_id: engagement_id.clone(),
            input,
            output: output.clone(),
            mismatch_resolved: workflow.detected_mismatch().is_some(),
            resolution_attempts: workflow.resolution_attempts(),
            created_at: now,
            updated_at: now,
        };

        let assessment_id = self
            .store
            .create_assessment(snapshot.clone())
            .map_err(|err| {
                error!(engagement = %engagement_id, error = %err, "failed to create assessment");
                err
            })?;

        let update = EngagementUpdate {
            status: Some(EngagementStatus::AssessmentComplete),
            recommended_package: Some(output.recommended_package),
        };
        if let Err(err) = self.store.update_engagement(&engagement_id, update) {
            warn!(
                engagement = %engagement_id,
                assessment = %assessment_id,
                error = %err,
                "engagement update failed; removing assessment"
            );
            if let Err(cleanup) = self.store.delete_assessment(&assessment_id) {
                error!(
                    assessment = %assessment_id,
                    error = %cleanup,
                    "failed to remove assessment after engagement update failure"
                );
            }
            return Err(err.into());
        }

        workflow.complete(assessment_id.clone(), output.clone());
        info!(
            engagement = %engagement_id,
            assessment = %assessment_id,
            package = ?output.recommended_package,
            confidence = ?output.confidence_level,
            "assessment completed"
        );

        let notification = AssessmentNotification {
            template: "assessment_completed".to_string(),
            engagement_id: engagement_id.clone(),
            recipient: self.config.notify_recipient.clone(),
            package: output.recommended_package,
            title: engagement.title,
        };
        if let Err(err) = self.notifier.notify(notification) {
            warn!(engagement = %engagement_id, error = %err, "assessment notification failed");
        }

        Ok(AssessmentRecord {
            id: assessment_id,
            snapshot,
        })
    }

    pub fn history(
        &self,
        engagement_id: &EngagementId,
    ) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        self.store
            .get_engagement(engagement_id)?
            .ok_or_else(|| AssessmentServiceError::EngagementNotFound(engagement_id.clone()))?;
        Ok(self.store.assessments_for(engagement_id)?)
    }

    /// Run one transition against the held session and store the result,
    /// whether the transition succeeded or not. Transitions are serialized so
    /// two requests cannot both advance the same snapshot.
    fn transition<T>(
        &self,
        workflow: &mut AssessmentWorkflow,
        step: impl FnOnce(&mut AssessmentWorkflow) -> Result<T, AssessmentServiceError>,
    ) -> Result<T, AssessmentServiceError> {
        let mut sessions = self.sessions();
        let engagement_id = workflow.engagement_id().clone();
        let fresh = AssessmentWorkflow::new(engagement_id.clone());

        if *workflow != fresh && sessions.get(&engagement_id) != Some(&*workflow) {
            warn!(
                engagement = %engagement_id,
                stage = %workflow.stage(),
                "rejecting workflow snapshot that differs from the held session"
            );
            *workflow = sessions.get(&engagement_id).cloned().unwrap_or(fresh);
            return Err(AssessmentServiceError::StaleWorkflow(engagement_id));
        }

        let result = step(workflow);
        sessions.insert(engagement_id, workflow.clone());
        result
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<EngagementId, AssessmentWorkflow>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("engagement {0} not found")]
    EngagementNotFound(EngagementId),
    #[error("workflow snapshot for engagement {0} is out of date")]
    StaleWorkflow(EngagementId),
    #[error("assessment records unavailable: {0}")]
    Persistence(#[from] StoreError),
}

impl AssessmentServiceError {
    /// Whether the user can retry the same action without changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AssessmentServiceError::Persistence(StoreError::Unavailable(_))
        )
    }
}
