use std::sync::Arc;

use db::{
    DBService, DbErr,
    store::{IssueStore, open_store},
    types::IssueLayout,
};

use crate::config::ServerConfig;

/// Shared handler state: the connection pool and the issue store built on it.
#[derive(Clone)]
pub struct Deployment {
    db: DBService,
    issues: Arc<dyn IssueStore>,
}

impl Deployment {
    pub async fn new(config: &ServerConfig) -> Result<Self, DbErr> {
        let db = DBService::connect(&config.database_url).await?;
        Ok(Self::from_db(db, config.layout))
    }

    pub fn from_db(db: DBService, layout: IssueLayout) -> Self {
        let issues = open_store(layout, &db);
        tracing::info!(layout = %issues.layout(), "Issue store ready");
        Self { db, issues }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn issues(&self) -> &Arc<dyn IssueStore> {
        &self.issues
    }
}
