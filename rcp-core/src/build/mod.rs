// rcp-core/src/build/mod.rs
//! Configure-then-build delegation to an external build tool.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rcp_common::dependency::ResolvedGraph;
use rcp_common::error::Result;
use rcp_common::manifest::OptionOverrides;

pub mod cmake;
pub mod env;
pub mod trigger;

pub use cmake::CMakeDriver;
pub use env::BuildEnvironment;
pub use trigger::{BuildState, BuildTrigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            "relwithdebinfo" => Ok(Self::RelWithDebInfo),
            "minsizerel" => Ok(Self::MinSizeRel),
            other => Err(format!(
                "unknown build type '{other}' (expected Debug, Release, RelWithDebInfo or MinSizeRel)"
            )),
        }
    }
}

/// Everything the configure step reads besides the resolved dependencies.
/// Passed explicitly; nothing is read from the ambient environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub build_type: BuildType,
    /// CMake generator name (`-G`); the tool's default when unset.
    pub generator: Option<String>,
    pub jobs: Option<usize>,
    /// Extra `-DKEY=VALUE` cache entries.
    pub defines: Vec<(String, String)>,
}

impl BuildConfig {
    pub fn new(source_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            build_dir: build_dir.into(),
            build_type: BuildType::default(),
            generator: None,
            jobs: None,
            defines: Vec::new(),
        }
    }
}

/// Output of a successful configure step; input of the build step.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub program: PathBuf,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub build_type: BuildType,
    pub jobs: Option<usize>,
    pub configure_args: Vec<String>,
    pub env: BuildEnvironment,
}

impl BuildPlan {
    pub fn new(program: impl Into<PathBuf>, config: &BuildConfig) -> Self {
        Self {
            program: program.into(),
            source_dir: config.source_dir.clone(),
            build_dir: config.build_dir.clone(),
            build_type: config.build_type,
            jobs: config.jobs,
            configure_args: Vec::new(),
            env: BuildEnvironment::default(),
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }
}

/// The external build tool, reduced to the two calls a recipe makes.
pub trait BuildDriver {
    fn configure(
        &self,
        dependencies: &ResolvedGraph,
        options: &OptionOverrides,
        config: &BuildConfig,
    ) -> Result<BuildPlan>;

    fn build(&self, plan: &BuildPlan) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_type_parses_case_insensitively() {
        assert_eq!("debug".parse::<BuildType>().unwrap(), BuildType::Debug);
        assert_eq!(
            "RELWITHDEBINFO".parse::<BuildType>().unwrap(),
            BuildType::RelWithDebInfo
        );
        assert!("profile".parse::<BuildType>().is_err());
        assert_eq!(BuildType::default().to_string(), "Release");
    }
}
