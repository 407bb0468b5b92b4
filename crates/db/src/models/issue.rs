use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{issue, project_issue};

/// An issue as returned to API clients. Field order matches the wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub issue_title: String,
    pub issue_text: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub created_by: String,
    pub assigned_to: String,
    pub open: bool,
    pub status_text: String,
}

impl From<project_issue::Model> for Issue {
    fn from(model: project_issue::Model) -> Self {
        Self {
            id: model.uuid,
            issue_title: model.issue_title,
            issue_text: model.issue_text,
            created_on: model.created_on,
            updated_on: model.updated_on,
            created_by: model.created_by,
            assigned_to: model.assigned_to,
            open: model.open,
            status_text: model.status_text,
        }
    }
}

impl From<issue::Model> for Issue {
    fn from(model: issue::Model) -> Self {
        Self {
            id: model.uuid,
            issue_title: model.issue_title,
            issue_text: model.issue_text,
            created_on: model.created_on,
            updated_on: model.updated_on,
            created_by: model.created_by,
            assigned_to: model.assigned_to,
            open: model.open,
            status_text: model.status_text,
        }
    }
}

/// Validated input for a new issue. The three required fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIssue {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
}

impl CreateIssue {
    /// Returns `None` when any required field is absent or empty.
    pub fn new(
        issue_title: Option<String>,
        issue_text: Option<String>,
        created_by: Option<String>,
        assigned_to: Option<String>,
        status_text: Option<String>,
    ) -> Option<Self> {
        Some(Self {
            issue_title: issue_title.filter(|v| !v.is_empty())?,
            issue_text: issue_text.filter(|v| !v.is_empty())?,
            created_by: created_by.filter(|v| !v.is_empty())?,
            assigned_to: assigned_to.unwrap_or_default(),
            status_text: status_text.unwrap_or_default(),
        })
    }
}

/// Partial update. `None` leaves the stored value untouched; `Some` always
/// overwrites, including `Some(false)` and `Some(String::new())`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateIssue {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl UpdateIssue {
    pub fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }
}

/// The `_id` part of a list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFilter {
    Valid(Uuid),
    /// Present but not a parseable identifier.
    Malformed,
}

impl IdFilter {
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Self::Valid(id),
            Err(_) => Self::Malformed,
        }
    }
}

/// String columns that can be matched by equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueField {
    IssueTitle,
    IssueText,
    CreatedBy,
    AssignedTo,
    StatusText,
}

/// Conjunction of equality predicates over one project's issues. Fields left
/// as `None` do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub id: Option<IdFilter>,
    pub open: Option<bool>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
}

impl IssueFilter {
    pub fn with_id(mut self, raw: Option<&str>) -> Self {
        self.id = non_empty(raw).map(IdFilter::parse);
        self
    }

    /// Query strings carry `open` as text: only `"true"` is true. A present but
    /// blank value still constrains the result, selecting closed issues.
    pub fn with_open(mut self, raw: Option<&str>) -> Self {
        self.open = raw.map(|v| v == "true");
        self
    }

    pub fn with_text(mut self, field: IssueField, raw: Option<&str>) -> Self {
        let value = non_empty(raw).map(str::to_string);
        match field {
            IssueField::IssueTitle => self.issue_title = value,
            IssueField::IssueText => self.issue_text = value,
            IssueField::CreatedBy => self.created_by = value,
            IssueField::AssignedTo => self.assigned_to = value,
            IssueField::StatusText => self.status_text = value,
        }
        self
    }

    pub fn text_predicates(&self) -> Vec<(IssueField, &str)> {
        [
            (IssueField::IssueTitle, &self.issue_title),
            (IssueField::IssueText, &self.issue_text),
            (IssueField::CreatedBy, &self.created_by),
            (IssueField::AssignedTo, &self.assigned_to),
            (IssueField::StatusText, &self.status_text),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|v| !v.is_empty())
}
