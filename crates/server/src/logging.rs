use tracing_subscriber::{EnvFilter, prelude::*};

pub const DEFAULT_LOG_LEVEL: &str = "info";

fn filter_directives(level: &str) -> String {
    format!("warn,issue_tracker={level},db={level},db_migration={level},tower_http={level}")
}

/// Installs the global fmt subscriber, scoped to the workspace crates at the
/// level named by `RUST_LOG`.
pub fn init() -> anyhow::Result<()> {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .map(|level| level.trim().to_string())
        .filter(|level| !level.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let env_filter = EnvFilter::try_new(filter_directives(&log_level))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_parse_for_common_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(EnvFilter::try_new(filter_directives(level)).is_ok());
        }
    }
}
