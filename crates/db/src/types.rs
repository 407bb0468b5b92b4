use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How issues are laid out in the database.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IssueLayout {
    /// Issues live under a `projects` row and are resolved through it.
    #[default]
    Embedded,
    /// Issues are standalone rows carrying the project name.
    Flat,
}
