use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use super::{IssueStore, field_condition};
use crate::{
    DbPool,
    entities::project_issue,
    models::{
        ids,
        issue::{CreateIssue, IdFilter, Issue, IssueField, IssueFilter, UpdateIssue},
        project::Project,
    },
    types::IssueLayout,
};

/// Issues stored as an ordered list under their `projects` row.
#[derive(Clone)]
pub struct EmbeddedIssueStore {
    db: DbPool,
}

impl EmbeddedIssueStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

fn column(field: IssueField) -> project_issue::Column {
    match field {
        IssueField::IssueTitle => project_issue::Column::IssueTitle,
        IssueField::IssueText => project_issue::Column::IssueText,
        IssueField::CreatedBy => project_issue::Column::CreatedBy,
        IssueField::AssignedTo => project_issue::Column::AssignedTo,
        IssueField::StatusText => project_issue::Column::StatusText,
    }
}

fn apply_patch(active: &mut project_issue::ActiveModel, patch: &UpdateIssue) {
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
impl IssueStore for EmbeddedIssueStore {
    fn layout(&self) -> IssueLayout {
        IssueLayout::Embedded
    }

    async fn list(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>, DbErr> {
        let Some(project_id) = ids::project_id_by_name(&self.db, project).await? else {
            return Ok(Vec::new());
        };

        let mut query = project_issue::Entity::find()
            .filter(project_issue::Column::ProjectId.eq(project_id))
            .filter(field_condition(filter, project_issue::Column::Open, column));
        // A malformed id is dropped from the predicate rather than matching nothing.
        if let Some(IdFilter::Valid(id)) = filter.id {
            query = query.filter(project_issue::Column::Uuid.eq(id));
        }

        let models = query
            .order_by_asc(project_issue::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Issue::from).collect())
    }

    async fn create(&self, project: &str, data: &CreateIssue) -> Result<Issue, DbErr> {
        let tx = self.db.begin().await?;
        let project_id = Project::ensure_row_id(&tx, project).await?;

        let now = Utc::now();
        let active = project_issue::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            project_id: Set(project_id),
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
        let model = active.insert(&tx).await?;
        Project::touch(&tx, project_id).await?;
        tx.commit().await?;

        tracing::debug!(project, issue_id = %model.uuid, "Created issue");
        Ok(Issue::from(model))
    }

    async fn update(
        &self,
        project: &str,
        id: Uuid,
        patch: &UpdateIssue,
    ) -> Result<Option<Issue>, DbErr> {
        let Some(project_id) = ids::project_id_by_name(&self.db, project).await? else {
            return Ok(None);
        };
        let Some(record) = project_issue::Entity::find()
            .filter(project_issue::Column::ProjectId.eq(project_id))
            .filter(project_issue::Column::Uuid.eq(id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: project_issue::ActiveModel = record.into();
        apply_patch(&mut active, patch);
        let updated = active.update(&self.db).await?;
        Project::touch(&self.db, project_id).await?;

        tracing::debug!(project, issue_id = %id, "Updated issue");
        Ok(Some(Issue::from(updated)))
    }

    async fn delete(&self, project: &str, id: Uuid) -> Result<u64, DbErr> {
        let Some(project_id) = ids::project_id_by_name(&self.db, project).await? else {
            return Ok(0);
        };
        let Some(row_id) = ids::project_issue_id_by_uuid(&self.db, project_id, id).await? else {
            return Ok(0);
        };

        let result = project_issue::Entity::delete_by_id(row_id)
            .exec(&self.db)
            .await?;
        if result.rows_affected > 0 {
            Project::touch(&self.db, project_id).await?;
            tracing::debug!(project, issue_id = %id, "Deleted issue");
        }
        Ok(result.rows_affected)
    }
}
