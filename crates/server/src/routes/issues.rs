use axum::{
    Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::issue::{CreateIssue, Issue, IssueField, IssueFilter, UpdateIssue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    Deployment,
    error::{ApiError, LookupFailure},
    extract::JsonOrForm,
};

/// Recognized GET filters. Everything arrives as text; unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct IssueQuery {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub open: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
}

impl From<&IssueQuery> for IssueFilter {
    fn from(query: &IssueQuery) -> Self {
        IssueFilter::default()
            .with_id(query.id.as_deref())
            .with_open(query.open.as_deref())
            .with_text(IssueField::IssueTitle, query.issue_title.as_deref())
            .with_text(IssueField::IssueText, query.issue_text.as_deref())
            .with_text(IssueField::CreatedBy, query.created_by.as_deref())
            .with_text(IssueField::AssignedTo, query.assigned_to.as_deref())
            .with_text(IssueField::StatusText, query.status_text.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateIssueRequest {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
}

/// PUT body. Values are captured loosely so that the ordered checks in
/// [`update_issue`] run before any field is type-checked.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateIssueRequest {
    #[serde(rename = "_id")]
    pub id: Option<Value>,
    pub issue_title: Option<Value>,
    pub issue_text: Option<Value>,
    pub created_by: Option<Value>,
    pub assigned_to: Option<Value>,
    pub status_text: Option<Value>,
    pub open: Option<Value>,
}

impl UpdateIssueRequest {
    /// Required fields can never be blanked, so an empty value counts as absent
    /// for them. `assigned_to` and `status_text` may be cleared with `""`.
    pub fn patch(&self) -> Result<UpdateIssue, ApiError> {
        let required = |name: &str, value: &Option<Value>| {
            text_field(name, value).map(|text| text.filter(|v: &String| !v.is_empty()))
        };
        Ok(UpdateIssue {
            issue_title: required("issue_title", &self.issue_title)?,
            issue_text: required("issue_text", &self.issue_text)?,
            created_by: required("created_by", &self.created_by)?,
            assigned_to: text_field("assigned_to", &self.assigned_to)?,
            status_text: text_field("status_text", &self.status_text)?,
            open: flag_field(&self.open)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteIssueRequest {
    #[serde(rename = "_id")]
    pub id: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct MutationResult {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

/// Strings pass through; numbers and booleans are stored in their text form.
fn text_field(name: &str, value: &Option<Value>) -> Result<Option<String>, ApiError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(scalar.to_string())),
        Some(_) => Err(ApiError::BadRequest(format!("{name} must be a string"))),
    }
}

/// Accepts a JSON boolean, or `"true"`/`"false"` as sent by form posts.
/// Empty strings and `null` mean the flag was not supplied.
fn flag_field(value: &Option<Value>) -> Result<Option<bool>, ApiError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(Value::String(text)) => match text.trim() {
            "" => Ok(None),
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(ApiError::BadRequest(format!(
                "open must be true or false, got \"{other}\""
            ))),
        },
        Some(other) => Err(ApiError::BadRequest(format!(
            "open must be true or false, got {other}"
        ))),
    }
}

/// An `_id` as the client sent it, echoed verbatim in responses.
struct SuppliedId {
    raw: String,
    /// `None` when the value is not a string holding a UUID.
    parsed: Option<Uuid>,
}

fn required_id(value: Option<Value>) -> Result<SuppliedId, ApiError> {
    match value {
        None | Some(Value::Null) => Err(ApiError::MissingId),
        Some(Value::String(raw)) if raw.trim().is_empty() => Err(ApiError::MissingId),
        Some(Value::String(raw)) => {
            let parsed = Uuid::parse_str(raw.trim()).ok();
            Ok(SuppliedId { raw, parsed })
        }
        Some(other) => Ok(SuppliedId {
            raw: other.to_string(),
            parsed: None,
        }),
    }
}

pub async fn list_issues(
    State(deployment): State<Deployment>,
    Path(project): Path<String>,
    query: Result<Query<IssueQuery>, QueryRejection>,
) -> Result<ResponseJson<Vec<Issue>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let filter = IssueFilter::from(&query);
    let issues = deployment.issues().list(&project, &filter).await?;
    Ok(ResponseJson(issues))
}

pub async fn create_issue(
    State(deployment): State<Deployment>,
    Path(project): Path<String>,
    JsonOrForm(payload): JsonOrForm<CreateIssueRequest>,
) -> Result<ResponseJson<Issue>, ApiError> {
    let data = CreateIssue::new(
        payload.issue_title,
        payload.issue_text,
        payload.created_by,
        payload.assigned_to,
        payload.status_text,
    )
    .ok_or(ApiError::MissingRequiredFields)?;

    let issue = deployment.issues().create(&project, &data).await?;
    Ok(ResponseJson(issue))
}

pub async fn update_issue(
    State(deployment): State<Deployment>,
    Path(project): Path<String>,
    JsonOrForm(mut payload): JsonOrForm<UpdateIssueRequest>,
) -> Result<ResponseJson<MutationResult>, ApiError> {
    let supplied = required_id(payload.id.take())?;
    let patch = payload.patch()?;
    let raw_id = supplied.raw;
    if patch.is_empty() {
        return Err(ApiError::NoUpdateFields { id: raw_id });
    }
    let Some(id) = supplied.parsed else {
        return Err(ApiError::CouldNotUpdate {
            id: raw_id,
            reason: LookupFailure::InvalidId,
        });
    };

    match deployment.issues().update(&project, id, &patch).await? {
        Some(_) => Ok(ResponseJson(MutationResult {
            result: "successfully updated",
            id: raw_id,
        })),
        None => Err(ApiError::CouldNotUpdate {
            id: raw_id,
            reason: LookupFailure::NotFound,
        }),
    }
}

pub async fn delete_issue(
    State(deployment): State<Deployment>,
    Path(project): Path<String>,
    JsonOrForm(payload): JsonOrForm<DeleteIssueRequest>,
) -> Result<ResponseJson<MutationResult>, ApiError> {
    let supplied = required_id(payload.id)?;
    let raw_id = supplied.raw;
    let Some(id) = supplied.parsed else {
        return Err(ApiError::CouldNotDelete {
            id: raw_id,
            reason: LookupFailure::InvalidId,
        });
    };

    if deployment.issues().delete(&project, id).await? == 0 {
        return Err(ApiError::CouldNotDelete {
            id: raw_id,
            reason: LookupFailure::NotFound,
        });
    }
    Ok(ResponseJson(MutationResult {
        result: "successfully deleted",
        id: raw_id,
    }))
}

pub fn router() -> Router<Deployment> {
    Router::new().route(
        "/issues/{project}",
        get(list_issues)
            .post(create_issue)
            .put(update_issue)
            .delete(delete_issue),
    )
}
