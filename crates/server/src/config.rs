use std::str::FromStr;

use db::types::IssueLayout;
use strip_ansi_escapes::strip;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://issue-tracker.sqlite?mode=rwc";

const HOST_ENV: &str = "HOST";
const BACKEND_PORT_ENV: &str = "BACKEND_PORT";
const PORT_ENV: &str = "PORT";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const LAYOUT_ENV: &str = "ISSUE_STORE_LAYOUT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid ISSUE_STORE_LAYOUT value '{0}': expected 'embedded' or 'flat'")]
    InvalidLayout(String),
}

/// Process settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    /// 0 asks the OS for a free port.
    pub port: u16,
    pub database_url: String,
    pub layout: IssueLayout,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: 0,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            layout: IssueLayout::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = read_var(HOST_ENV).unwrap_or(defaults.host);
        let port = read_var(BACKEND_PORT_ENV)
            .or_else(|| read_var(PORT_ENV))
            .and_then(|raw| {
                let port = parse_port(&raw);
                if port.is_none() {
                    tracing::warn!(value = raw, "Invalid port; using an auto-assigned port");
                }
                port
            })
            .unwrap_or_else(|| {
                tracing::info!("No PORT environment variable set, using port 0 for auto-assignment");
                0
            });
        let database_url = read_var(DATABASE_URL_ENV).unwrap_or(defaults.database_url);
        let layout = match read_var(LAYOUT_ENV) {
            Some(raw) => {
                IssueLayout::from_str(&raw).map_err(|_| ConfigError::InvalidLayout(raw))?
            }
            None => defaults.layout,
        };

        Ok(Self {
            host,
            port,
            database_url,
            layout,
        })
    }
}

fn read_var(name: &str) -> Option<String> {
    let raw = match std::env::var(name) {
        Ok(value) => value,
        Err(std::env::VarError::NotPresent) => return None,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to read {name}; using default");
            return None;
        }
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        tracing::warn!("{name} is set but empty; using default");
        return None;
    }
    Some(trimmed.to_string())
}

fn parse_port(raw: &str) -> Option<u16> {
    // Remove any ANSI codes a wrapping dev script may have injected.
    let cleaned = String::from_utf8(strip(raw.as_bytes())).ok()?;
    cleaned.trim().parse::<u16>().ok()
}
