use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::{project, project_issue};

pub async fn project_id_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<i64>, DbErr> {
    project::Entity::find()
        .select_only()
        .column(project::Column::Id)
        .filter(project::Column::Name.eq(name))
        .into_tuple()
        .one(db)
        .await
}

/// Row id of an embedded issue, only if it belongs to the given project row.
pub async fn project_issue_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    project_id: i64,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    project_issue::Entity::find()
        .select_only()
        .column(project_issue::Column::Id)
        .filter(project_issue::Column::ProjectId.eq(project_id))
        .filter(project_issue::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use crate::models::project::Project;

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn project_ids_resolve_by_name() {
        let db = setup_db().await;

        assert_eq!(project_id_by_name(&db, "apitest").await.unwrap(), None);

        let created = Project::ensure_row_id(&db, "apitest").await.unwrap();
        let row_id = project_id_by_name(&db, "apitest")
            .await
            .unwrap()
            .expect("project row id");
        assert_eq!(created, row_id);
        assert_eq!(
            project_issue_id_by_uuid(&db, row_id, Uuid::new_v4())
                .await
                .unwrap(),
            None
        );
    }
}
