use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, Condition, DbErr};
use uuid::Uuid;

use crate::{
    DBService,
    models::issue::{CreateIssue, Issue, IssueField, IssueFilter, UpdateIssue},
    types::IssueLayout,
};

mod embedded;
mod flat;

pub use embedded::EmbeddedIssueStore;
pub use flat::FlatIssueStore;

/// Persistence for issues partitioned by project name.
///
/// Mutations are scoped to `project`: an id that exists under another project
/// behaves exactly like an unknown id.
#[async_trait]
pub trait IssueStore: Send + Sync {
    fn layout(&self) -> IssueLayout;

    /// Matching issues in insertion order. Unknown projects yield an empty list.
    async fn list(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>, DbErr>;

    async fn create(&self, project: &str, data: &CreateIssue) -> Result<Issue, DbErr>;

    /// Applies `patch` and refreshes `updated_on`. `None` when no such issue exists.
    async fn update(
        &self,
        project: &str,
        id: Uuid,
        patch: &UpdateIssue,
    ) -> Result<Option<Issue>, DbErr>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete(&self, project: &str, id: Uuid) -> Result<u64, DbErr>;
}

pub fn open_store(layout: IssueLayout, db: &DBService) -> Arc<dyn IssueStore> {
    match layout {
        IssueLayout::Embedded => Arc::new(EmbeddedIssueStore::new(db.pool.clone())),
        IssueLayout::Flat => Arc::new(FlatIssueStore::new(db.pool.clone())),
    }
}

/// Equality predicates for `open` and the string fields of `filter`.
fn field_condition<C, F>(filter: &IssueFilter, open_column: C, column: F) -> Condition
where
    C: ColumnTrait,
    F: Fn(IssueField) -> C,
{
    let mut condition = Condition::all();
    if let Some(open) = filter.open {
        condition = condition.add(open_column.eq(open));
    }
    for (field, value) in filter.text_predicates() {
        condition = condition.add(column(field).eq(value));
    }
    condition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::issue::IdFilter;

    async fn stores() -> Vec<Arc<dyn IssueStore>> {
        let db = DBService::connect("sqlite::memory:").await.unwrap();
        vec![
            open_store(IssueLayout::Embedded, &db),
            open_store(IssueLayout::Flat, &db),
        ]
    }

    fn new_issue(title: &str, assigned_to: &str) -> CreateIssue {
        CreateIssue {
            issue_title: title.to_string(),
            issue_text: format!("{title} text"),
            created_by: "alice".to_string(),
            assigned_to: assigned_to.to_string(),
            status_text: String::new(),
        }
    }

    #[tokio::test]
    async fn created_issue_is_open_with_equal_timestamps() {
        for store in stores().await {
            let issue = store
                .create("apitest", &new_issue("first", ""))
                .await
                .unwrap();
            assert!(issue.open, "{}", store.layout());
            assert_eq!(issue.created_on, issue.updated_on);
            assert_eq!(issue.assigned_to, "");
            assert_eq!(issue.status_text, "");
        }
    }

    #[tokio::test]
    async fn list_preserves_insertion_order_per_project() {
        for store in stores().await {
            let a = store.create("p1", &new_issue("a", "")).await.unwrap();
            store.create("p2", &new_issue("other", "")).await.unwrap();
            let b = store.create("p1", &new_issue("b", "")).await.unwrap();
            let c = store.create("p1", &new_issue("c", "")).await.unwrap();

            let listed = store.list("p1", &IssueFilter::default()).await.unwrap();
            let ids: Vec<Uuid> = listed.iter().map(|i| i.id).collect();
            assert_eq!(ids, vec![a.id, b.id, c.id], "{}", store.layout());

            assert!(
                store
                    .list("missing", &IssueFilter::default())
                    .await
                    .unwrap()
                    .is_empty()
            );
        }
    }

    #[tokio::test]
    async fn list_intersects_open_and_text_filters() {
        for store in stores().await {
            let keep = store.create("p", &new_issue("keep", "bob")).await.unwrap();
            let closed = store.create("p", &new_issue("closed", "bob")).await.unwrap();
            store.create("p", &new_issue("carol's", "carol")).await.unwrap();
            store
                .update(
                    "p",
                    closed.id,
                    &UpdateIssue {
                        open: Some(false),
                        ..Default::default()
                    },
                )
                .await
                .unwrap()
                .expect("closed issue updated");

            let open_only = store
                .list("p", &IssueFilter::default().with_open(Some("true")))
                .await
                .unwrap();
            assert_eq!(open_only.len(), 2);
            assert!(open_only.iter().all(|i| i.open));

            let filter = IssueFilter::default()
                .with_open(Some("true"))
                .with_text(IssueField::AssignedTo, Some("bob"));
            let both = store.list("p", &filter).await.unwrap();
            assert_eq!(both.len(), 1);
            assert_eq!(both[0].id, keep.id);

            let substring = IssueFilter::default().with_text(IssueField::AssignedTo, Some("bo"));
            assert!(store.list("p", &substring).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_id_filter_depends_on_layout() {
        for store in stores().await {
            store.create("p", &new_issue("one", "")).await.unwrap();
            let filter = IssueFilter {
                id: Some(IdFilter::Malformed),
                ..Default::default()
            };
            let listed = store.list("p", &filter).await.unwrap();
            match store.layout() {
                IssueLayout::Embedded => assert_eq!(listed.len(), 1),
                IssueLayout::Flat => assert!(listed.is_empty()),
            }
        }
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        for store in stores().await {
            let created = store
                .create("p", &new_issue("title", "bob"))
                .await
                .unwrap();

            let updated = store
                .update(
                    "p",
                    created.id,
                    &UpdateIssue {
                        issue_title: Some("renamed".to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap()
                .expect("issue exists");

            assert_eq!(updated.issue_title, "renamed");
            assert_eq!(updated.issue_text, created.issue_text);
            assert_eq!(updated.created_by, created.created_by);
            assert_eq!(updated.assigned_to, "bob");
            assert!(updated.open);
            assert_eq!(updated.created_on, created.created_on);
            assert!(updated.updated_on >= created.updated_on);

            let filter = IssueFilter::default().with_id(Some(&created.id.to_string()));
            let fetched = store.list("p", &filter).await.unwrap();
            assert_eq!(fetched, vec![updated]);
        }
    }

    #[tokio::test]
    async fn update_and_delete_are_scoped_to_project() {
        for store in stores().await {
            let created = store.create("p", &new_issue("title", "")).await.unwrap();
            store.create("q", &new_issue("elsewhere", "")).await.unwrap();
            let patch = UpdateIssue {
                status_text: Some("done".to_string()),
                ..Default::default()
            };

            assert!(store.update("q", created.id, &patch).await.unwrap().is_none());
            assert!(
                store
                    .update("missing", created.id, &patch)
                    .await
                    .unwrap()
                    .is_none()
            );
            assert_eq!(store.delete("q", created.id).await.unwrap(), 0);
            assert!(
                store
                    .update("p", Uuid::new_v4(), &patch)
                    .await
                    .unwrap()
                    .is_none()
            );
        }
    }

    #[tokio::test]
    async fn delete_removes_once() {
        for store in stores().await {
            let created = store.create("p", &new_issue("gone", "")).await.unwrap();

            assert_eq!(store.delete("p", created.id).await.unwrap(), 1);
            assert_eq!(store.delete("p", created.id).await.unwrap(), 0);

            let filter = IssueFilter::default().with_id(Some(&created.id.to_string()));
            assert!(store.list("p", &filter).await.unwrap().is_empty());
        }
    }
}
