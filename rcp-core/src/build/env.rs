use std::collections::BTreeMap;
use std::env;
use std::process::Command;

use rcp_common::dependency::ResolvedGraph;
use rcp_common::error::{RcpError, Result};
use tracing::debug;

// Ambient search-path variables that would let the build pick up packages
// other than the resolved ones. We set the ones CMake needs ourselves.
const ENV_VARS_TO_REMOVE: &[&str] = &[
    "CMAKE_PREFIX_PATH",
    "CMAKE_INCLUDE_PATH",
    "CMAKE_LIBRARY_PATH",
    "CMAKE_FRAMEWORK_PATH",
    "PKG_CONFIG_PATH",
    "PKG_CONFIG_LIBDIR",
    "CPATH",
    "LIBRARY_PATH",
];

/// Environment for configure/build commands derived from the resolved graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnvironment {
    vars: BTreeMap<String, String>,
}

impl BuildEnvironment {
    pub fn for_graph(graph: &ResolvedGraph) -> Result<Self> {
        let mut vars = BTreeMap::new();

        let prefixes = graph.prefix_paths();
        if !prefixes.is_empty() {
            let joined = env::join_paths(&prefixes).map_err(|e| {
                RcpError::BuildEnvError(format!("Cannot build CMAKE_PREFIX_PATH: {e}"))
            })?;
            vars.insert(
                "CMAKE_PREFIX_PATH".to_string(),
                joined.to_string_lossy().into_owned(),
            );
        }

        let pkg_config_dirs: Vec<_> = graph
            .packages
            .iter()
            .flat_map(|p| p.lib_dirs.iter().map(|d| d.join("pkgconfig")))
            .collect();
        if !pkg_config_dirs.is_empty() {
            let joined = env::join_paths(&pkg_config_dirs).map_err(|e| {
                RcpError::BuildEnvError(format!("Cannot build PKG_CONFIG_PATH: {e}"))
            })?;
            vars.insert(
                "PKG_CONFIG_PATH".to_string(),
                joined.to_string_lossy().into_owned(),
            );
        }

        debug!("Build environment: {:?}", vars);
        Ok(Self { vars })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn apply_to_command(&self, cmd: &mut Command) {
        for var in ENV_VARS_TO_REMOVE {
            cmd.env_remove(var);
        }
        cmd.envs(&self.vars);
    }
}
