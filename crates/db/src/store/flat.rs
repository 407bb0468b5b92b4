use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::{IssueStore, field_condition};
use crate::{
    DbPool,
    entities::issue,
    models::issue::{CreateIssue, IdFilter, Issue, IssueField, IssueFilter, UpdateIssue},
    types::IssueLayout,
};

/// Issues stored as standalone rows tagged with their project name.
#[derive(Clone)]
pub struct FlatIssueStore {
    db: DbPool,
}

impl FlatIssueStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

fn column(field: IssueField) -> issue::Column {
    match field {
        IssueField::IssueTitle => issue::Column::IssueTitle,
        IssueField::IssueText => issue::Column::IssueText,
        IssueField::CreatedBy => issue::Column::CreatedBy,
        IssueField::AssignedTo => issue::Column::AssignedTo,
        IssueField::StatusText => issue::Column::StatusText,
    }
}

fn apply_patch(active: &mut issue::ActiveModel, patch: &UpdateIssue) {
    if let Some(issue_title) = &patch.issue_title {
        active.issue_title = Set(issue_title.clone());
    }
    if let Some(issue_text) = &patch.issue_text {
        active.issue_text = Set(issue_text.clone());
    }
    if let Some(created_by) = &patch.created_by {
        active.created_by = Set(created_by.clone());
    }
    if let Some(assigned_to) = &patch.assigned_to {
        active.assigned_to = Set(assigned_to.clone());
    }
    if let Some(status_text) = &patch.status_text {
        active.status_text = Set(status_text.clone());
    }
    if let Some(open) = patch.open {
        active.open = Set(open);
    }
    active.updated_on = Set(Utc::now());
}

#[async_trait]
impl IssueStore for FlatIssueStore {
    fn layout(&self) -> IssueLayout {
        IssueLayout::Flat
    }

    async fn list(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>, DbErr> {
        let mut query = issue::Entity::find()
            .filter(issue::Column::Project.eq(project))
            .filter(field_condition(filter, issue::Column::Open, column));
        match filter.id {
            Some(IdFilter::Valid(id)) => query = query.filter(issue::Column::Uuid.eq(id)),
            Some(IdFilter::Malformed) => return Ok(Vec::new()),
            None => {}
        }

        let models = query.order_by_asc(issue::Column::Id).all(&self.db).await?;
        Ok(models.into_iter().map(Issue::from).collect())
    }

    async fn create(&self, project: &str, data: &CreateIssue) -> Result<Issue, DbErr> {
        let now = Utc::now();
        let active = issue::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            project: Set(project.to_string()),
            issue_title: Set(data.issue_title.clone()),
            issue_text: Set(data.issue_text.clone()),
            created_by: Set(data.created_by.clone()),
            assigned_to: Set(data.assigned_to.clone()),
            status_text: Set(data.status_text.clone()),
            open: Set(true),
            created_on: Set(now),
            updated_on: Set(now),
            ..Default::default()
        };
        let model = active.insert(&self.db).await?;

        tracing::debug!(project, issue_id = %model.uuid, "Created issue");
        Ok(Issue::from(model))
    }

    async fn update(
        &self,
        project: &str,
        id: Uuid,
        patch: &UpdateIssue,
    ) -> Result<Option<Issue>, DbErr> {
        let Some(record) = issue::Entity::find()
            .filter(issue::Column::Project.eq(project))
            .filter(issue::Column::Uuid.eq(id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: issue::ActiveModel = record.into();
        apply_patch(&mut active, patch);

        let updated = active.update(&self.db).await?;
        tracing::debug!(project, issue_id = %id, "Updated issue");
        Ok(Some(Issue::from(updated)))
    }

    async fn delete(&self, project: &str, id: Uuid) -> Result<u64, DbErr> {
        let result = issue::Entity::delete_many()
            .filter(issue::Column::Project.eq(project))
            .filter(issue::Column::Uuid.eq(id))
            .exec(&self.db)
            .await?;
        if result.rows_affected > 0 {
            tracing::debug!(project, issue_id = %id, "Deleted issue");
        }
        Ok(result.rows_affected)
    }
}
