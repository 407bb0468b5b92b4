use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set, sea_query::OnConflict};
use uuid::Uuid;

use super::ids;
use crate::entities::project;

/// Project rows are created implicitly by the first issue filed under a name.
pub struct Project;

impl Project {
    /// Inserts the project unless a row with the same name already exists.
    /// Returns whether a row was written.
    async fn insert_if_absent<C: ConnectionTrait>(
        db: &C,
        name: &str,
        project_id: Uuid,
    ) -> Result<bool, DbErr> {
        let now = Utc::now();
        let active = project::ActiveModel {
            uuid: Set(project_id),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let inserted = project::Entity::insert(active)
            .on_conflict(
                OnConflict::column(project::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(inserted > 0)
    }

    /// Row id of the named project, creating the project if it does not exist.
    pub async fn ensure_row_id<C: ConnectionTrait>(db: &C, name: &str) -> Result<i64, DbErr> {
        if let Some(id) = ids::project_id_by_name(db, name).await? {
            return Ok(id);
        }

        let project_id = Uuid::new_v4();
        if Self::insert_if_absent(db, name, project_id).await? {
            tracing::info!(project = name, %project_id, "Created project on first issue");
        }
        ids::project_id_by_name(db, name)
            .await?
            .ok_or(DbErr::RecordNotFound(format!("Project {name} not found")))
    }

    pub async fn touch<C: ConnectionTrait>(db: &C, row_id: i64) -> Result<(), DbErr> {
        let record = project::Entity::find_by_id(row_id)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        let mut active: project::ActiveModel = record.into();
        active.updated_at = Set(Utc::now());
        active.update(db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{Database, PaginatorTrait};
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn ensure_row_id_creates_once() {
        let db = setup_db().await;

        let first = Project::ensure_row_id(&db, "alpha").await.unwrap();
        let second = Project::ensure_row_id(&db, "alpha").await.unwrap();
        assert_eq!(first, second);

        let other = Project::ensure_row_id(&db, "beta").await.unwrap();
        assert_ne!(first, other);

        assert_eq!(ids::project_id_by_name(&db, "alpha").await.unwrap(), Some(first));
        assert_eq!(ids::project_id_by_name(&db, "gamma").await.unwrap(), None);
    }

    #[tokio::test]
    async fn conflicting_insert_keeps_the_existing_row() {
        let db = setup_db().await;
        let first = Project::ensure_row_id(&db, "alpha").await.unwrap();

        // A second writer that missed the lookup must not fail or duplicate the row.
        let inserted = Project::insert_if_absent(&db, "alpha", Uuid::new_v4())
            .await
            .unwrap();
        assert!(!inserted);
        assert_eq!(project::Entity::find().count(&db).await.unwrap(), 1);
        assert_eq!(Project::ensure_row_id(&db, "alpha").await.unwrap(), first);
    }
}
