use sea_orm::DbErr;

use crate::{
    models::issue::{CreateIssue, IssueField, IssueFilter},
    store::IssueStore,
};

pub const DEFAULT_SEED_PROJECT: &str = "apitest";

fn demo_issues() -> Vec<CreateIssue> {
    vec![
        CreateIssue {
            issue_title: "Test Issue 1".to_string(),
            issue_text: "This is the first test issue".to_string(),
            created_by: "User1".to_string(),
            assigned_to: "Assignee1".to_string(),
            status_text: "Open".to_string(),
        },
        CreateIssue {
            issue_title: "Test Issue 2".to_string(),
            issue_text: "This is the second test issue".to_string(),
            created_by: "User2".to_string(),
            assigned_to: "Assignee2".to_string(),
            status_text: "Closed".to_string(),
        },
    ]
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// Inserts the demo issues into `project`, skipping titles that already exist there.
pub async fn seed_demo_issues(store: &dyn IssueStore, project: &str) -> Result<SeedReport, DbErr> {
    let mut report = SeedReport::default();
    for issue in demo_issues() {
        let filter =
            IssueFilter::default().with_text(IssueField::IssueTitle, Some(&issue.issue_title));
        if store.list(project, &filter).await?.is_empty() {
            store.create(project, &issue).await?;
            tracing::info!(project, title = %issue.issue_title, "Created demo issue");
            report.created += 1;
        } else {
            tracing::info!(project, title = %issue.issue_title, "Demo issue already exists");
            report.skipped += 1;
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DBService, store::open_store, types::IssueLayout};

    #[tokio::test]
    async fn seeding_twice_only_creates_once() {
        let db = DBService::connect("sqlite::memory:").await.unwrap();
        for layout in [IssueLayout::Embedded, IssueLayout::Flat] {
            let store = open_store(layout, &db);

            let first = seed_demo_issues(store.as_ref(), DEFAULT_SEED_PROJECT)
                .await
                .unwrap();
            assert_eq!(first, SeedReport { created: 2, skipped: 0 });

            let second = seed_demo_issues(store.as_ref(), DEFAULT_SEED_PROJECT)
                .await
                .unwrap();
            assert_eq!(second, SeedReport { created: 0, skipped: 2 });

            let all = store
                .list(DEFAULT_SEED_PROJECT, &IssueFilter::default())
                .await
                .unwrap();
            assert_eq!(all.len(), 2);
            assert_eq!(all[1].status_text, "Closed");
        }
    }
}
