// src/resolver.rs

//! Transitive dependency resolution
//!
//! Walks a package's dependency graph depth-first in pre-order: a package
//! is fully resolved, including its source artifact, before its
//! dependencies are visited. The walk is iterative over an explicit work
//! stack so deep or cyclic graphs cannot overflow the call stack; cycles
//! are broken by the dedup check.
//!
//! Failures are isolated per node: a package whose metadata, source
//! distribution, artifact, license, or requirement expressions cannot be
//! processed is logged and omitted together with its subtree, and
//! resolution of the rest of the graph continues.
//!
//! Deduplication is first-wins on the package name alone. A later request
//! for an already-resolved name is treated as satisfied even when it
//! carries a conflicting version constraint; the conflicting request is
//! silently discarded. This mirrors the single-resolution-per-name output
//! model and is a documented limitation, not conflict resolution.

use crate::artifact::ArtifactSource;
use crate::error::{Error, Result};
use crate::license::LicenseMap;
use crate::registry::Registry;
use crate::requirement::{self, Dependency};
use std::collections::HashSet;
use tracing::{debug, warn};

/// One resolved registry package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    /// Exact resolved version; never empty once constructed
    pub version: String,
    pub summary: String,
    pub homepage: String,
    pub author: String,
    pub author_email: String,
    /// Canonical license identifier
    pub license: String,
    /// License file path relative to `src_dir`
    pub license_file: String,
    /// MD5 of the license file bytes
    pub license_md5: String,
    /// Single top-level directory inside the extracted source archive
    pub src_dir: String,
    pub src_uri: String,
    pub src_md5: String,
    pub src_sha256: String,
    pub dependencies: Vec<Dependency>,
}

/// Run configuration for one resolution walk
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Follow dependencies carrying a conditional-extra tag
    pub follow_extras: bool,
}

/// Insertion-ordered set of resolved packages, deduplicated by name
///
/// Created once per invocation and grown monotonically during the walk;
/// the renderer consumes it without mutating it.
#[derive(Debug, Default)]
pub struct ResolutionSet {
    packages: Vec<Package>,
    seen: HashSet<String>,
}

impl ResolutionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a package of this name has already been resolved
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// Insert a package unless its name is already present (first wins)
    ///
    /// Returns `false` when the name was already resolved and the package
    /// was discarded.
    pub fn insert(&mut self, package: Package) -> bool {
        if !self.seen.insert(package.name.clone()) {
            return false;
        }
        self.packages.push(package);
        true
    }

    /// Resolved packages in resolution order
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Package> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Pending node of the resolution walk
struct WorkItem {
    name: String,
    version: Option<String>,
    extra: Option<String>,
    depth: usize,
}

/// Tree-drawing prefix for the human-readable progress trace
fn indent_str(depth: usize) -> String {
    if depth == 0 {
        String::new()
    } else {
        format!("|{} ", "-".repeat(depth * 2 - 2))
    }
}

/// Resolves packages against a registry and an artifact source
pub struct Resolver<'a> {
    registry: &'a dyn Registry,
    artifacts: &'a dyn ArtifactSource,
    licenses: LicenseMap,
    options: ResolveOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(
        registry: &'a dyn Registry,
        artifacts: &'a dyn ArtifactSource,
        licenses: LicenseMap,
        options: ResolveOptions,
    ) -> Self {
        Self {
            registry,
            artifacts,
            licenses,
            options,
        }
    }

    /// The license table, including mappings learned during resolution
    pub fn licenses(&self) -> &LicenseMap {
        &self.licenses
    }

    /// Consume the resolver, returning the license table for dumping
    pub fn into_licenses(self) -> LicenseMap {
        self.licenses
    }

    /// Resolve one root package into a fresh [`ResolutionSet`]
    pub fn resolve(&mut self, name: &str, version: Option<&str>) -> ResolutionSet {
        let mut set = ResolutionSet::new();
        self.resolve_into(&mut set, name, version);
        set
    }

    /// Resolve one root package, appending to an existing [`ResolutionSet`]
    ///
    /// Packages already present in `set` are treated as satisfied, so
    /// multiple roots (a requirements list) share one dedup context.
    pub fn resolve_into(&mut self, set: &mut ResolutionSet, name: &str, version: Option<&str>) {
        let mut stack = vec![WorkItem {
            name: name.to_string(),
            version: version.map(str::to_string),
            extra: None,
            depth: 0,
        }];

        while let Some(item) = stack.pop() {
            if set.contains(&item.name) {
                // First resolution wins; a conflicting version or extra on
                // this request is discarded.
                debug!("{} already resolved, skipping", item.name);
                continue;
            }

            let extra_str = item
                .extra
                .as_deref()
                .map(|extra| format!("[{extra}]"))
                .unwrap_or_default();
            let version_str = item
                .version
                .as_deref()
                .map(|version| format!("=={version}"))
                .unwrap_or_default();
            println!(
                "  {}{}{}{}",
                indent_str(item.depth),
                item.name,
                extra_str,
                version_str
            );

            match self.resolve_node(&item.name, item.version.as_deref()) {
                Ok(package) => {
                    let children: Vec<WorkItem> = package
                        .dependencies
                        .iter()
                        .map(|dep| WorkItem {
                            name: dep.name.clone(),
                            version: dep.version.clone(),
                            extra: dep.extra.clone(),
                            depth: item.depth + 1,
                        })
                        .collect();

                    set.insert(package);

                    // Reversed push keeps dependency-list order across the
                    // LIFO stack.
                    for child in children.into_iter().rev() {
                        stack.push(child);
                    }
                }
                Err(e) => {
                    warn!("Failed to gather {}: {}", item.name, e);
                    println!(
                        "  {}[ERROR] Failed to gather {} ({})",
                        indent_str(item.depth),
                        item.name,
                        e
                    );
                }
            }
        }
    }

    /// Resolve a single package: metadata, source artifact, license,
    /// dependency expressions
    fn resolve_node(&mut self, name: &str, version: Option<&str>) -> Result<Package> {
        let metadata = self.registry.project(name, version)?;

        let version = match version {
            Some(version) => version.to_string(),
            None => metadata.info.version.clone(),
        };
        if version.is_empty() {
            return Err(Error::ResolutionError(format!(
                "registry reported an empty version for {name}"
            )));
        }

        let sdist = metadata.sdist_for(&version).ok_or_else(|| {
            Error::NotFoundError(format!("no source distribution for {name} {version}"))
        })?;
        let src_uri = sdist.url.clone();

        let artifact = self.artifacts.fetch_and_verify(name, &version, &src_uri)?;

        let raw_license = metadata.info.license.clone().unwrap_or_default();
        let license = self.licenses.normalize(&raw_license)?;

        let dependencies =
            self.parse_dependencies(metadata.info.requires_dist.as_deref())?;

        Ok(Package {
            name: name.to_string(),
            version,
            summary: metadata.info.summary.unwrap_or_default(),
            homepage: metadata.info.home_page.unwrap_or_default(),
            author: metadata.info.author.unwrap_or_default(),
            author_email: metadata.info.author_email.unwrap_or_default(),
            license,
            license_file: artifact.license_file,
            license_md5: artifact.license_md5,
            src_dir: artifact.src_dir,
            src_uri,
            src_md5: artifact.src_md5,
            src_sha256: artifact.src_sha256,
            dependencies,
        })
    }

    /// Parse raw requirement expressions into the package's dependency list
    ///
    /// Dependencies carrying an extra tag are excluded unless the run
    /// follows extras. A malformed expression fails the node.
    fn parse_dependencies(&self, requires_dist: Option<&[String]>) -> Result<Vec<Dependency>> {
        let mut dependencies = Vec::new();

        if let Some(expressions) = requires_dist {
            for expression in expressions {
                let dependency = requirement::parse_requirement(expression)?;
                if dependency.extra.is_some() && !self.options.follow_extras {
                    continue;
                }
                dependencies.push(dependency);
            }
        }

        Ok(dependencies)
    }
}
