// FILE: rcp-common/src/dependency/resolver.rs

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{RcpError, Result};
use crate::index::{IndexVersion, PackageIndex};
use crate::manifest::{
    Manifest, OptionOverrides, OptionValue, PackageIdentity, PackageReference,
};
use crate::store::{package_id, PackageStore};

// --- ResolutionContext ---
pub struct ResolutionContext<'a> {
    pub index: &'a PackageIndex,
    pub store: &'a PackageStore,
    /// Fail resolution when a package is not present in the local store.
    pub require_installed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStatus {
    Installed,
    Missing,
}

// --- ResolvedPackage ---
#[derive(Debug, Clone)]
pub struct ResolvedPackage {
    pub reference: PackageReference,
    /// Required by the manifest itself rather than through another package.
    pub direct: bool,
    pub header_only: bool,
    pub options: BTreeMap<String, OptionValue>,
    pub package_id: String,
    pub root: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub libs: Vec<String>,
    pub defines: Vec<String>,
    pub requires: Vec<String>,
    pub status: ResolutionStatus,
}

impl ResolvedPackage {
    pub fn name(&self) -> &str {
        &self.reference.name
    }

    pub fn version(&self) -> &str {
        &self.reference.version
    }
}

/// Resolved dependencies in link order: every package precedes the packages
/// it requires.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    pub root: PackageIdentity,
    pub packages: Vec<ResolvedPackage>,
    pub overrides: OptionOverrides,
}

impl ResolvedGraph {
    pub fn get(&self, name: &str) -> Option<&ResolvedPackage> {
        self.packages.iter().find(|p| p.name() == name)
    }

    pub fn missing(&self) -> Vec<&ResolvedPackage> {
        self.packages
            .iter()
            .filter(|p| p.status == ResolutionStatus::Missing)
            .collect()
    }

    /// Package roots, suitable for `CMAKE_PREFIX_PATH`.
    pub fn prefix_paths(&self) -> Vec<PathBuf> {
        self.packages.iter().map(|p| p.root.clone()).collect()
    }
}

struct Node {
    reference: PackageReference,
    version: IndexVersion,
    direct: bool,
}

pub struct DependencyResolver<'a> {
    context: ResolutionContext<'a>,
    nodes: HashMap<String, Node>,
    first_seen: Vec<String>,
    visiting: Vec<String>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(context: ResolutionContext<'a>) -> Self {
        Self {
            context,
            nodes: HashMap::new(),
            first_seen: Vec::new(),
            visiting: Vec::new(),
        }
    }

    pub fn resolve(&mut self, manifest: &Manifest) -> Result<ResolvedGraph> {
        debug!(
            "Starting dependency resolution for {}: {:?}",
            manifest.identity(),
            manifest
                .requires()
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
        );
        self.nodes.clear();
        self.first_seen.clear();
        self.visiting.clear();

        for reference in manifest.requires() {
            self.visit(reference, true)?;
        }

        self.validate_overrides(manifest.options())?;

        let ordered = self.topological_sort()?;
        let mut packages = Vec::with_capacity(ordered.len());
        for name in ordered {
            let node = &self.nodes[&name];
            packages.push(self.materialize(node, manifest.options()));
        }

        let missing: Vec<String> = packages
            .iter()
            .filter(|p| p.status == ResolutionStatus::Missing)
            .map(|p| format!("{}:{}", p.reference, p.package_id))
            .collect();
        if !missing.is_empty() {
            if self.context.require_installed {
                debug!("Packages missing from the local store: {:?}", missing);
                return Err(RcpError::PackageMissing(missing.join(", ")));
            }
            warn!(
                "Packages missing from the local store (continuing): {}",
                missing.join(", ")
            );
        }

        debug!(
            "Final link order: {:?}",
            packages
                .iter()
                .map(|p| p.reference.to_string())
                .collect::<Vec<_>>()
        );

        Ok(ResolvedGraph {
            root: manifest.identity().clone(),
            packages,
            overrides: manifest.options().clone(),
        })
    }

    /// Depth-first walk of one requirement edge.
    fn visit(&mut self, reference: &PackageReference, direct: bool) -> Result<()> {
        let name = reference.name.as_str();

        // -------- cycle guard -------------------------------------------------------------
        if let Some(pos) = self.visiting.iter().position(|n| n == name) {
            let mut chain = self.visiting[pos..].to_vec();
            chain.push(name.to_string());
            debug!("Dependency cycle detected: {}", chain.join(" -> "));
            return Err(RcpError::DependencyError(format!(
                "Dependency cycle detected: {}",
                chain.join(" -> ")
            )));
        }

        // -------- already seen: versions must agree ---------------------------------------
        if let Some(existing) = self.nodes.get_mut(name) {
            if existing.reference.version != reference.version {
                return Err(RcpError::DependencyError(format!(
                    "Version conflict for '{name}': {} and {} are both required",
                    existing.reference, reference
                )));
            }
            existing.direct |= direct;
            debug!("'{}' already resolved.", reference);
            return Ok(());
        }

        // -------- first time we see this node ---------------------------------------------
        let version = self.context.index.lookup(reference)?.clone();
        debug!(
            "Resolved {} (header_only={}, requires={:?})",
            reference,
            version.header_only,
            version
                .requires
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
        );

        let children = version.requires.clone();
        self.nodes.insert(
            name.to_string(),
            Node {
                reference: reference.clone(),
                version,
                direct,
            },
        );
        self.first_seen.push(name.to_string());

        self.visiting.push(name.to_string());
        for child in &children {
            self.visit(child, false)?;
        }
        self.visiting.pop();
        Ok(())
    }

    fn validate_overrides(&self, overrides: &OptionOverrides) -> Result<()> {
        for (key, value) in overrides.iter() {
            let node = self
                .nodes
                .get(&key.package)
                .ok_or_else(|| RcpError::OptionTargetNotRequired(key.to_string()))?;
            let spec = node.version.options.get(&key.option).ok_or_else(|| {
                RcpError::UnknownOption {
                    package: key.package.clone(),
                    option: key.option.clone(),
                    known: node.version.options.keys().cloned().collect(),
                }
            })?;
            if !spec.allows(value) {
                return Err(RcpError::InvalidOptionValue {
                    package: key.package.clone(),
                    option: key.option.clone(),
                    value: value.to_string(),
                    allowed: spec.values.iter().map(|v| v.to_string()).collect(),
                });
            }
            debug!("Option override {} = {} accepted", key, value);
        }
        Ok(())
    }

    fn materialize(&self, node: &Node, overrides: &OptionOverrides) -> ResolvedPackage {
        let name = node.reference.name.as_str();
        let version = node.reference.version.as_str();

        let mut options: BTreeMap<String, OptionValue> = node
            .version
            .options
            .iter()
            .map(|(k, spec)| (k.clone(), spec.default.clone()))
            .collect();
        for (key, value) in overrides.for_package(name) {
            options.insert(key.option.clone(), value.clone());
        }

        let id = package_id(&options);
        let root = self.context.store.package_path(name, version, &id);
        let status = if self.context.store.is_installed(name, version, &id) {
            ResolutionStatus::Installed
        } else {
            ResolutionStatus::Missing
        };

        ResolvedPackage {
            reference: node.reference.clone(),
            direct: node.direct,
            header_only: node.version.header_only,
            include_dirs: node
                .version
                .include_dirs
                .iter()
                .map(|d| root.join(d))
                .collect(),
            lib_dirs: node.version.lib_dirs.iter().map(|d| root.join(d)).collect(),
            libs: node.version.libs.clone(),
            defines: node.version.defines.clone(),
            requires: node
                .version
                .requires
                .iter()
                .map(|r| r.name.clone())
                .collect(),
            options,
            package_id: id,
            root,
            status,
        }
    }

    /// Kahn's algorithm over requirement edges, seeded in first-seen order.
    fn topological_sort(&self) -> Result<Vec<String>> {
        let mut in_degree: HashMap<&str, usize> = self
            .first_seen
            .iter()
            .map(|n| (n.as_str(), 0usize))
            .collect();
        let mut edges_seen = HashSet::new();
        for name in &self.first_seen {
            for child in &self.nodes[name].version.requires {
                if edges_seen.insert((name.as_str(), child.name.as_str())) {
                    if let Some(degree) = in_degree.get_mut(child.name.as_str()) {
                        *degree += 1;
                    }
                }
            }
        }

        let mut queue: VecDeque<&str> = self
            .first_seen
            .iter()
            .map(String::as_str)
            .filter(|n| in_degree.get(n) == Some(&0))
            .collect();
        let mut sorted = Vec::with_capacity(self.first_seen.len());
        let mut emitted = HashSet::new();

        while let Some(name) = queue.pop_front() {
            if !emitted.insert(name) {
                continue;
            }
            sorted.push(name.to_string());
            let mut released = HashSet::new();
            for child in &self.nodes[name].version.requires {
                if !released.insert(child.name.as_str()) {
                    continue;
                }
                if let Some(degree) = in_degree.get_mut(child.name.as_str()) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(child.name.as_str());
                    }
                }
            }
        }

        if sorted.len() != self.first_seen.len() {
            debug!(
                "Cycle detected! Sorted count ({}) != node count ({}).",
                sorted.len(),
                self.first_seen.len()
            );
            return Err(RcpError::DependencyError(
                "Circular dependency detected".to_string(),
            ));
        }
        Ok(sorted)
    }
}
