pub mod ids;
pub mod issue;
pub mod project;
