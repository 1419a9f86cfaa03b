use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::AssessmentConfig;
use crate::workflows::assessment::domain::{
    AssessmentId, BudgetRange, CurrentState, EngagementId, MarketingTiming, Need,
    RecommendationInput, TimelineExpectation, WebsiteScope,
};
use crate::workflows::assessment::intake::IntakeForm;
use crate::workflows::assessment::store::{
    AssessmentNotification, AssessmentRecord, AssessmentSnapshot, EngagementRecord,
    EngagementStatus, EngagementStore, EngagementUpdate, Notifier, NotifyError, StoreError,
};
use crate::workflows::assessment::AssessmentService;

pub(super) const ENGAGEMENT: &str = "eng-042";

pub(super) fn engagement_id() -> EngagementId {
    EngagementId(ENGAGEMENT.to_string())
}

pub(super) fn engagement() -> EngagementRecord {
    EngagementRecord {
        id: engagement_id(),
        title: "Harbor Yoga relaunch".to_string(),
        client_name: "Harbor Yoga".to_string(),
        contact_email: "owner@harboryoga.example".to_string(),
        status: EngagementStatus::Discovery,
        recommended_package: None,
    }
}

pub(super) fn assessment_config() -> AssessmentConfig {
    AssessmentConfig {
        max_resolution_attempts: 3,
        notify_recipient: "studio@example.com".to_string(),
    }
}

/// Scenario A: small site, foundation-first, matching budget.
pub(super) fn aligned_form() -> IntakeForm {
    IntakeForm {
        current_state: Some("basics".to_string()),
        needs: vec!["website".to_string()],
        website_scope: Some("compact".to_string()),
        marketing_timing: Some("foundation_first".to_string()),
        budget_range: Some("foundation_budget".to_string()),
        timeline_expectation: Some("normal".to_string()),
        target_date: None,
    }
}

/// Scenario B: every mismatch condition fires at once.
pub(super) fn conflicted_form() -> IntakeForm {
    IntakeForm {
        marketing_timing: Some("together".to_string()),
        website_scope: Some("extensive".to_string()),
        timeline_expectation: Some("asap".to_string()),
        ..aligned_form()
    }
}

pub(super) fn input(
    scope: WebsiteScope,
    timing: MarketingTiming,
    budget: BudgetRange,
    timeline: TimelineExpectation,
) -> RecommendationInput {
    RecommendationInput {
        current_state: CurrentState::Basics,
        needs: [Need::Website].into_iter().collect(),
        website_scope: scope,
        marketing_timing: timing,
        budget_range: budget,
        timeline_expectation: timeline,
        target_date: None,
    }
}

/// Every well-formed input the closed vocabularies allow.
pub(super) fn all_inputs() -> Vec<RecommendationInput> {
    let scopes = [
        WebsiteScope::Compact,
        WebsiteScope::Standard,
        WebsiteScope::Comprehensive,
        WebsiteScope::Extensive,
    ];
    let timings = [
        MarketingTiming::FoundationFirst,
        MarketingTiming::Together,
        MarketingTiming::Ongoing,
    ];
    let budgets = [
        BudgetRange::FoundationBudget,
        BudgetRange::GrowthBudget,
        BudgetRange::PerformanceBudget,
        BudgetRange::Unsure,
    ];
    let timelines = [
        TimelineExpectation::Asap,
        TimelineExpectation::Normal,
        TimelineExpectation::Patient,
        TimelineExpectation::SpecificDate,
    ];

    let mut inputs = Vec::new();
    for scope in scopes {
        for timing in timings {
            for budget in budgets {
                for timeline in timelines {
                    let mut candidate = input(scope, timing, budget, timeline);
                    if timeline == TimelineExpectation::SpecificDate {
                        candidate.target_date = chrono::NaiveDate::from_ymd_opt(2026, 6, 1);
                    }
                    inputs.push(candidate);
                }
            }
        }
    }
    inputs
}

pub(super) fn build_service() -> (
    AssessmentService<MemoryStore, MemoryNotifier>,
    Arc<MemoryStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(MemoryStore::with_engagement(engagement()));
    let notifier = Arc::new(MemoryNotifier::default());
    let service = AssessmentService::new(store.clone(), notifier.clone(), assessment_config());
    (service, store, notifier)
}

#[derive(Default)]
pub(super) struct MemoryStore {
    sequence: AtomicU64,
    pub(super) assessments: Mutex<Vec<AssessmentRecord>>,
    pub(super) engagements: Mutex<HashMap<EngagementId, EngagementRecord>>,
}

impl MemoryStore {
    pub(super) fn with_engagement(record: EngagementRecord) -> Self {
        let store = Self::default();
        store
            .engagements
            .lock()
            .expect("engagement mutex poisoned")
            .insert(record.id.clone(), record);
        store
    }

    pub(super) fn assessment_count(&self) -> usize {
        self.assessments
            .lock()
            .expect("assessment mutex poisoned")
            .len()
    }

    pub(super) fn engagement(&self, id: &EngagementId) -> Option<EngagementRecord> {
        self.engagements
            .lock()
            .expect("engagement mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl EngagementStore for MemoryStore {
    fn create_assessment(&self, snapshot: AssessmentSnapshot) -> Result<AssessmentId, StoreError> {
        let next = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = AssessmentId(format!("asm-{next:04}"));
        self.assessments
            .lock()
            .expect("assessment mutex poisoned")
            .push(AssessmentRecord {
                id: id.clone(),
                snapshot,
            });
        Ok(id)
    }

    fn delete_assessment(&self, id: &AssessmentId) -> Result<(), StoreError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
        let before = guard.len();
        guard.retain(|record| &record.id != id);
        if guard.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn assessments_for(
        &self,
        engagement_id: &EngagementId,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        let guard = self.assessments.lock().expect("assessment mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|record| &record.snapshot.engagement_id == engagement_id)
            .cloned()
            .collect())
    }

    fn get_engagement(&self, id: &EngagementId) -> Result<Option<EngagementRecord>, StoreError> {
        Ok(self.engagement(id))
    }

    fn update_engagement(
        &self,
        id: &EngagementId,
        update: EngagementUpdate,
    ) -> Result<(), StoreError> {
        let mut guard = self.engagements.lock().expect("engagement mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(package) = update.recommended_package {
            record.recommended_package = Some(package);
        }
        Ok(())
    }
}

/// Store whose writes fail while reads keep working.
pub(super) struct OfflineWritesStore {
    pub(super) inner: MemoryStore,
}

impl OfflineWritesStore {
    pub(super) fn new() -> Self {
        Self {
            inner: MemoryStore::with_engagement(engagement()),
        }
    }
}

impl EngagementStore for OfflineWritesStore {
    fn create_assessment(&self, _snapshot: AssessmentSnapshot) -> Result<AssessmentId, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn delete_assessment(&self, id: &AssessmentId) -> Result<(), StoreError> {
        self.inner.delete_assessment(id)
    }

    fn assessments_for(
        &self,
        engagement_id: &EngagementId,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        self.inner.assessments_for(engagement_id)
    }

    fn get_engagement(&self, id: &EngagementId) -> Result<Option<EngagementRecord>, StoreError> {
        self.inner.get_engagement(id)
    }

    fn update_engagement(
        &self,
        _id: &EngagementId,
        _update: EngagementUpdate,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Store that accepts the assessment row but cannot update the engagement.
pub(super) struct StaleEngagementStore {
    pub(super) inner: MemoryStore,
}

impl StaleEngagementStore {
    pub(super) fn new() -> Self {
        Self {
            inner: MemoryStore::with_engagement(engagement()),
        }
    }
}

impl EngagementStore for StaleEngagementStore {
    fn create_assessment(&self, snapshot: AssessmentSnapshot) -> Result<AssessmentId, StoreError> {
        self.inner.create_assessment(snapshot)
    }

    fn delete_assessment(&self, id: &AssessmentId) -> Result<(), StoreError> {
        self.inner.delete_assessment(id)
    }

    fn assessments_for(
        &self,
        engagement_id: &EngagementId,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        self.inner.assessments_for(engagement_id)
    }

    fn get_engagement(&self, id: &EngagementId) -> Result<Option<EngagementRecord>, StoreError> {
        self.inner.get_engagement(id)
    }

    fn update_engagement(
        &self,
        _id: &EngagementId,
        _update: EngagementUpdate,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("engagement table locked".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    events: Mutex<Vec<AssessmentNotification>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<AssessmentNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: AssessmentNotification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _notification: AssessmentNotification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp timeout".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
