pub mod issue;
pub mod project;
pub mod project_issue;
