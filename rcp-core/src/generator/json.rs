use std::collections::BTreeMap;
use std::path::PathBuf;

use rcp_common::dependency::ResolvedGraph;
use rcp_common::error::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct BuildInfo<'a> {
    name: &'a str,
    version: &'a str,
    options: BTreeMap<String, String>,
    dependencies: Vec<DependencyInfo<'a>>,
}

#[derive(Debug, Serialize)]
struct DependencyInfo<'a> {
    name: &'a str,
    version: &'a str,
    package_id: &'a str,
    direct: bool,
    header_only: bool,
    root: &'a PathBuf,
    include_dirs: &'a [PathBuf],
    lib_dirs: &'a [PathBuf],
    libs: &'a [String],
    defines: &'a [String],
    requires: &'a [String],
    options: BTreeMap<&'a str, String>,
}

pub fn render(graph: &ResolvedGraph) -> Result<String> {
    let info = BuildInfo {
        name: graph.root.name(),
        version: graph.root.version(),
        options: graph
            .overrides
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        dependencies: graph
            .packages
            .iter()
            .map(|p| DependencyInfo {
                name: p.name(),
                version: p.version(),
                package_id: &p.package_id,
                direct: p.direct,
                header_only: p.header_only,
                root: &p.root,
                include_dirs: &p.include_dirs,
                lib_dirs: &p.lib_dirs,
                libs: &p.libs,
                defines: &p.defines,
                requires: &p.requires,
                options: p
                    .options
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.to_string()))
                    .collect(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&info)?)
}
