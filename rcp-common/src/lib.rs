// rcp-common/src/lib.rs
pub mod cache;
pub mod config;
pub mod dependency;
pub mod error;
pub mod index;
pub mod manifest;
pub mod store;

// Re-export key types
pub use cache::Cache;
pub use config::Config;
pub use error::{Phase, RcpError, Result};
pub use index::PackageIndex;
pub use manifest::Manifest;
pub use store::PackageStore;
