// rcp-core/src/lib.rs

pub mod build;
pub mod generator;
pub mod pipeline;
pub mod update;

#[cfg(test)]
pub(crate) mod test_support;

pub use build::{BuildConfig, BuildDriver, BuildPlan, BuildTrigger, BuildType, CMakeDriver};
pub use pipeline::PipelineFlags;
pub use update::IndexSource;
