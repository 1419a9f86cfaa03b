use client_engagement::workflows::assessment::{
    AssessmentId, AssessmentNotification, AssessmentRecord, AssessmentSnapshot, EngagementId,
    EngagementRecord, EngagementStatus, EngagementStore, EngagementUpdate, Notifier, NotifyError,
    StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

pub(crate) const DEMO_ENGAGEMENT: &str = "eng-demo";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoreTables {
    next_assessment: u64,
    assessments: Vec<AssessmentRecord>,
    engagements: HashMap<EngagementId, EngagementRecord>,
}

/// Process-local engagement store used by the demo server and CLI.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEngagementStore {
    tables: Arc<Mutex<StoreTables>>,
}

impl InMemoryEngagementStore {
    pub(crate) fn seeded(records: impl IntoIterator<Item = EngagementRecord>) -> Self {
        let mut tables = StoreTables::default();
        for record in records {
            tables.engagements.insert(record.id.clone(), record);
        }
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, StoreTables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("engagement store lock poisoned".to_string()))
    }
}

impl EngagementStore for InMemoryEngagementStore {
    fn create_assessment(&self, snapshot: AssessmentSnapshot) -> Result<AssessmentId, StoreError> {
        let mut guard = self.tables()?;
        guard.next_assessment += 1;
        let id = AssessmentId(format!("asm-{:04}", guard.next_assessment));
        guard.assessments.push(AssessmentRecord {
            id: id.clone(),
            snapshot,
        });
        Ok(id)
    }

    fn delete_assessment(&self, id: &AssessmentId) -> Result<(), StoreError> {
        let mut guard = self.tables()?;
        let before = guard.assessments.len();
        guard.assessments.retain(|record| &record.id != id);
        if guard.assessments.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn assessments_for(
        &self,
        engagement_id: &EngagementId,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        let guard = self.tables()?;
        Ok(guard
            .assessments
            .iter()
            .rev()
            .filter(|record| &record.snapshot.engagement_id == engagement_id)
            .cloned()
            .collect())
    }

    fn get_engagement(&self, id: &EngagementId) -> Result<Option<EngagementRecord>, StoreError> {
        let guard = self.tables()?;
        Ok(guard.engagements.get(id).cloned())
    }

    fn update_engagement(
        &self,
        id: &EngagementId,
        update: EngagementUpdate,
    ) -> Result<(), StoreError> {
        let mut guard = self.tables()?;
        let record = guard.engagements.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(package) = update.recommended_package {
            record.recommended_package = Some(package);
        }
        Ok(())
    }
}

/// Notifier that records notifications and writes them to the log instead of sending mail.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotifier {
    events: Arc<Mutex<Vec<AssessmentNotification>>>,
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, notification: AssessmentNotification) -> Result<(), NotifyError> {
        info!(
            template = %notification.template,
            recipient = %notification.recipient,
            engagement = %notification.engagement_id,
            package = notification.package.label(),
            "notification queued"
        );
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotifyError::Transport("notification log lock poisoned".to_string()))?;
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotifier {
    pub(crate) fn events(&self) -> Vec<AssessmentNotification> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub(crate) fn demo_engagement() -> EngagementRecord {
    EngagementRecord {
        id: EngagementId(DEMO_ENGAGEMENT.to_string()),
        title: "Demo studio website relaunch".to_string(),
        client_name: "Demo Client".to_string(),
        contact_email: "client@example.com".to_string(),
        status: EngagementStatus::Discovery,
        recommended_package: None,
    }
}
