use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Projects::Table)
                    .col(pk_id_col(manager, Projects::Id))
                    .col(uuid_col(Projects::Uuid))
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(timestamp_col(Projects::CreatedAt))
                    .col(timestamp_col(Projects::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_projects_uuid")
                    .table(Projects::Table)
                    .col(Projects::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_projects_name")
                    .table(Projects::Table)
                    .col(Projects::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(ProjectIssues::Table)
                    .col(pk_id_col(manager, ProjectIssues::Id))
                    .col(uuid_col(ProjectIssues::Uuid))
                    .col(fk_id_col(manager, ProjectIssues::ProjectId))
                    .col(ColumnDef::new(ProjectIssues::IssueTitle).string().not_null())
                    .col(ColumnDef::new(ProjectIssues::IssueText).text().not_null())
                    .col(ColumnDef::new(ProjectIssues::CreatedBy).string().not_null())
                    .col(text_default_col(ProjectIssues::AssignedTo))
                    .col(text_default_col(ProjectIssues::StatusText))
                    .col(open_col(ProjectIssues::Open))
                    .col(timestamp_col(ProjectIssues::CreatedOn))
                    .col(timestamp_col(ProjectIssues::UpdatedOn))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_issues_project_id")
                            .from(ProjectIssues::Table, ProjectIssues::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_project_issues_uuid")
                    .table(ProjectIssues::Table)
                    .col(ProjectIssues::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_project_issues_project_id")
                    .table(ProjectIssues::Table)
                    .col(ProjectIssues::ProjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProjectIssues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn text_default_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .string()
        .not_null()
        .default(Expr::val(""))
        .to_owned()
}

fn open_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .boolean()
        .not_null()
        .default(Expr::val(true))
        .to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Uuid,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProjectIssues {
    Table,
    Id,
    Uuid,
    ProjectId,
    IssueTitle,
    IssueText,
    CreatedBy,
    AssignedTo,
    StatusText,
    Open,
    CreatedOn,
    UpdatedOn,
}
