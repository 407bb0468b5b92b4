pub mod config;
pub mod deployment;
pub mod error;
pub mod extract;
pub mod http;
pub mod logging;
pub mod routes;

#[cfg(test)]
mod test_support;

pub use deployment::Deployment;
