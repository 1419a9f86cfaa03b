use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::EngagementId;
use super::intake::IntakeForm;
use super::resolver::Remedy;
use super::service::{AssessmentService, AssessmentServiceError};
use super::store::{AssessmentView, EngagementStore, Notifier, StoreError};
use super::workflow::{AssessmentWorkflow, WorkflowError, WorkflowStage};

/// Workflow snapshot posted back by the client on each transition.
#[derive(Debug, Deserialize)]
pub struct WorkflowRequest {
    pub workflow: AssessmentWorkflow,
}

#[derive(Debug, Deserialize)]
pub struct RemedyRequest {
    pub workflow: AssessmentWorkflow,
    pub remedy: Remedy,
}

#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub stage: WorkflowStage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggested_remedies: Vec<Remedy>,
    pub workflow: AssessmentWorkflow,
}

impl From<AssessmentWorkflow> for WorkflowResponse {
    fn from(workflow: AssessmentWorkflow) -> Self {
        let suggested_remedies = match (workflow.stage(), workflow.recommendation()) {
            (WorkflowStage::Mismatch, Some(output)) => output
                .mismatch_type
                .map(|mismatch| Remedy::suggested_for(mismatch).to_vec())
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        Self {
            stage: workflow.stage(),
            suggested_remedies,
            workflow,
        }
    }
}

/// Router builder exposing the assessment workflow as JSON endpoints.
pub fn assessment_router<S, N>(service: Arc<AssessmentService<S, N>>) -> Router
where
    S: EngagementStore + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/engagements/:engagement_id/assessment/submit",
            post(submit_handler::<S, N>),
        )
        .route(
            "/api/v1/engagements/:engagement_id/assessment/resolve",
            post(resolve_handler::<S, N>),
        )
        .route(
            "/api/v1/engagements/:engagement_id/assessment/start-over",
            post(start_over_handler::<S, N>),
        )
        .route(
            "/api/v1/engagements/:engagement_id/assessment/accept",
            post(accept_handler::<S, N>),
        )
        .route(
            "/api/v1/engagements/:engagement_id/assessments",
            get(history_handler::<S, N>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<AssessmentService<S, N>>>,
    Path(engagement_id): Path<String>,
    axum::Json(form): axum::Json<IntakeForm>,
) -> Response
where
    S: EngagementStore + 'static,
    N: Notifier + 'static,
{
    let engagement_id = EngagementId(engagement_id);
    let mut workflow = match service.begin(&engagement_id) {
        Ok(workflow) => workflow,
        Err(err) => return error_response(err, None),
    };

    match service.submit(&mut workflow, &form) {
        Ok(_) => workflow_response(StatusCode::OK, workflow),
        Err(err) => error_response(err, Some(workflow)),
    }
}

pub(crate) async fn resolve_handler<S, N>(
    State(service): State<Arc<AssessmentService<S, N>>>,
    Path(engagement_id): Path<String>,
    axum::Json(request): axum::Json<RemedyRequest>,
) -> Response
where
    S: EngagementStore + 'static,
    N: Notifier + 'static,
{
    let RemedyRequest {
        mut workflow,
        remedy,
    } = request;
    if let Some(response) = reject_foreign_workflow(&engagement_id, &workflow) {
        return response;
    }

    match service.apply_remedy(&mut workflow, remedy) {
        Ok(_) => workflow_response(StatusCode::OK, workflow),
        Err(err) => error_response(err, Some(workflow)),
    }
}

pub(crate) async fn start_over_handler<S, N>(
    State(service): State<Arc<AssessmentService<S, N>>>,
    Path(engagement_id): Path<String>,
    axum::Json(request): axum::Json<WorkflowRequest>,
) -> Response
where
    S: EngagementStore + 'static,
    N: Notifier + 'static,
{
    let mut workflow = request.workflow;
    if let Some(response) = reject_foreign_workflow(&engagement_id, &workflow) {
        return response;
    }

    match service.start_over(&mut workflow) {
        Ok(()) => workflow_response(StatusCode::OK, workflow),
        Err(err) => error_response(err, Some(workflow)),
    }
}

pub(crate) async fn accept_handler<S, N>(
    State(service): State<Arc<AssessmentService<S, N>>>,
    Path(engagement_id): Path<String>,
    axum::Json(request): axum::Json<WorkflowRequest>,
) -> Response
where
    S: EngagementStore + 'static,
    N: Notifier + 'static,
{
    let mut workflow = request.workflow;
    if let Some(response) = reject_foreign_workflow(&engagement_id, &workflow) {
        return response;
    }

    match service.accept(&mut workflow) {
        Ok(record) => {
            let payload = json!({
                "assessment": record.view(),
                "workflow": WorkflowResponse::from(workflow),
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err, Some(workflow)),
    }
}

pub(crate) async fn history_handler<S, N>(
    State(service): State<Arc<AssessmentService<S, N>>>,
    Path(engagement_id): Path<String>,
) -> Response
where
    S: EngagementStore + 'static,
    N: Notifier + 'static,
{
    let engagement_id = EngagementId(engagement_id);
    match service.history(&engagement_id) {
        Ok(records) => {
            let views: Vec<AssessmentView> = records.iter().map(|record| record.view()).collect();
            let payload = json!({
                "engagement_id": engagement_id,
                "assessments": views,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err, None),
    }
}

fn reject_foreign_workflow(path_id: &str, workflow: &AssessmentWorkflow) -> Option<Response> {
    if workflow.engagement_id().0 == path_id {
        return None;
    }

    let payload = json!({
        "error": format!(
            "workflow belongs to engagement {}, not {}",
            workflow.engagement_id(),
            path_id
        ),
    });
    Some((StatusCode::BAD_REQUEST, axum::Json(payload)).into_response())
}

fn workflow_response(status: StatusCode, workflow: AssessmentWorkflow) -> Response {
    (status, axum::Json(WorkflowResponse::from(workflow))).into_response()
}

fn error_response(err: AssessmentServiceError, workflow: Option<AssessmentWorkflow>) -> Response {
    let status = match &err {
        AssessmentServiceError::Workflow(WorkflowError::Validation(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AssessmentServiceError::Workflow(_) | AssessmentServiceError::StaleWorkflow(_) => {
            StatusCode::CONFLICT
        }
        AssessmentServiceError::EngagementNotFound(_) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Persistence(StoreError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        AssessmentServiceError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut payload = json!({
        "error": err.to_string(),
        "retryable": err.is_retryable(),
    });
    if let AssessmentServiceError::Workflow(WorkflowError::Validation(errors)) = &err {
        payload["errors"] = json!(errors.0);
    }
    if let Some(workflow) = workflow {
        payload["workflow"] = json!(WorkflowResponse::from(workflow));
    }

    (status, axum::Json(payload)).into_response()
}
