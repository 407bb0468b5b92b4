use sea_orm_migration::cli;

/// Same database the server opens when `DATABASE_URL` is unset.
const DEFAULT_DATABASE_URL: &str = "sqlite://issue-tracker.sqlite?mode=rwc";

fn main() -> std::io::Result<()> {
    if std::env::var_os("DATABASE_URL").is_none() {
        // SAFETY: runs before the runtime starts any threads.
        unsafe {
            std::env::set_var("DATABASE_URL", DEFAULT_DATABASE_URL);
        }
    }

    tokio::runtime::Runtime::new()?.block_on(cli::run_cli(db_migration::Migrator));
    Ok(())
}
