//! Tier 1 assessment: intake normalization, package scoring, mismatch resolution and
//! the screen workflow that persists an accepted recommendation.

pub mod domain;
pub mod import;
pub mod intake;
pub mod resolver;
pub mod router;
pub mod scoring;
pub mod service;
pub mod store;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use domain::{
    AssessmentId, BudgetRange, ConfidenceLevel, CurrentState, EngagementId, MarketingTiming,
    MismatchType, Need, PackageTier, Reasoning, RecommendationInput, RecommendationOutput,
    TimelineExpectation, UnknownEnumValue, WebsiteScope,
};
pub use import::{BatchRecommendation, IntakeBatch, IntakeImportError};
pub use intake::{normalize, IntakeField, IntakeForm, ValidationError, ValidationErrors};
pub use resolver::{resolve, Remedy};
pub use router::assessment_router;
pub use scoring::{rescore, score};
pub use service::{AssessmentService, AssessmentServiceError};
pub use store::{
    AssessmentNotification, AssessmentRecord, AssessmentSnapshot, AssessmentView,
    EngagementRecord, EngagementStatus, EngagementStore, EngagementUpdate, Notifier,
    NotifyError, StoreError,
};
pub use workflow::{AssessmentWorkflow, WorkflowError, WorkflowStage};
