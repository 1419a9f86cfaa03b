use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AssessmentId, ConfidenceLevel, EngagementId, PackageTier, RecommendationInput,
    RecommendationOutput, UnknownEnumValue,
};

/// Accepted input/output pair handed to the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSnapshot {
    pub engagement_id: EngagementId,
    pub input: RecommendationInput,
    pub output: RecommendationOutput,
    pub mismatch_resolved: bool,
    pub resolution_attempts: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted assessment row, owned by the record store once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    #[serde(flatten)]
    pub snapshot: AssessmentSnapshot,
}

impl AssessmentRecord {
    pub fn view(&self) -> AssessmentView {
        let output = &self.snapshot.output;
        AssessmentView {
            assessment_id: self.id.clone(),
            engagement_id: self.snapshot.engagement_id.clone(),
            recommended_package: output.recommended_package,
            confidence_level: output.confidence_level,
            confidence_percent: output.confidence_percent,
            mismatch_resolved: self.snapshot.mismatch_resolved,
            primary_factor: output.reasoning.primary_factor.clone(),
            created_at: self.snapshot.created_at,
        }
    }
}

/// Client-facing summary; leaves out internal notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentView {
    pub assessment_id: AssessmentId,
    pub engagement_id: EngagementId,
    pub recommended_package: PackageTier,
    pub confidence_level: ConfidenceLevel,
    pub confidence_percent: u8,
    pub mismatch_resolved: bool,
    pub primary_factor: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    Discovery,
    AssessmentComplete,
    ProposalSent,
    Active,
    Closed,
}

/// External record representing one client project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub id: EngagementId,
    pub title: String,
    pub client_name: String,
    pub contact_email: String,
    pub status: EngagementStatus,
    #[serde(default)]
    pub recommended_package: Option<PackageTier>,
}

/// Partial update applied to an engagement row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementUpdate {
    pub status: Option<EngagementStatus>,
    pub recommended_package: Option<PackageTier>,
}

/// Keyed record store the workflow persists through. Each call is a single-row write.
pub trait EngagementStore: Send + Sync {
    fn create_assessment(&self, snapshot: AssessmentSnapshot) -> Result<AssessmentId, StoreError>;
    fn delete_assessment(&self, id: &AssessmentId) -> Result<(), StoreError>;
    /// Assessments for one engagement, newest first.
    fn assessments_for(
        &self,
        engagement_id: &EngagementId,
    ) -> Result<Vec<AssessmentRecord>, StoreError>;
    fn get_engagement(&self, id: &EngagementId) -> Result<Option<EngagementRecord>, StoreError>;
    fn update_engagement(
        &self,
        id: &EngagementId,
        update: EngagementUpdate,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("stored row is corrupt: {0}")]
    Corrupt(#[from] UnknownEnumValue),
}

/// Outbound notification hook (e-mail, chat, etc.). Best-effort.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: AssessmentNotification) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentNotification {
    pub template: String,
    pub engagement_id: EngagementId,
    pub recipient: String,
    pub package: PackageTier,
    pub title: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
