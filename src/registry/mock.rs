// src/registry/mock.rs

//! Deterministic in-memory registry for tests
//!
//! Serves canned [`ProjectMetadata`] records by package name and can be
//! told to fail specific packages, which is how the per-node failure
//! isolation of the resolver is exercised without a network.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

use super::metadata::{ProjectInfo, ProjectMetadata, ReleaseFile, SDIST_PACKAGE_TYPE};
use super::Registry;

/// In-memory [`Registry`] implementation
///
/// One metadata record is kept per package name; version-specific lookups
/// return the same record, mirroring the registry's behavior of serving a
/// full release map from every metadata URL.
#[derive(Debug, Default)]
pub struct MockRegistry {
    projects: HashMap<String, ProjectMetadata>,
    failures: HashSet<String>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a metadata record under its package name
    pub fn add(&mut self, metadata: ProjectMetadata) {
        self.projects.insert(metadata.info.name.clone(), metadata);
    }

    /// Make every lookup of `name` fail with a download error
    pub fn fail(&mut self, name: impl Into<String>) {
        self.failures.insert(name.into());
    }

    /// Build and register a simple project with one sdist release
    ///
    /// `requires_dist` entries are raw requirement expressions exactly as a
    /// registry would report them.
    pub fn add_project(&mut self, name: &str, version: &str, requires_dist: &[&str]) {
        self.add(project(name, version, requires_dist));
    }
}

/// Build a [`ProjectMetadata`] record with one sdist release for `version`
pub fn project(name: &str, version: &str, requires_dist: &[&str]) -> ProjectMetadata {
    let mut releases = HashMap::new();
    releases.insert(
        version.to_string(),
        vec![ReleaseFile {
            packagetype: SDIST_PACKAGE_TYPE.to_string(),
            url: format!("https://files.example.org/{name}-{version}.tar.gz"),
        }],
    );

    ProjectMetadata {
        info: ProjectInfo {
            name: name.to_string(),
            version: version.to_string(),
            summary: Some(format!("The {name} package")),
            home_page: Some(format!("https://example.org/{name}")),
            author: Some("Example Author".to_string()),
            author_email: Some("author@example.org".to_string()),
            license: Some("MIT".to_string()),
            requires_dist: if requires_dist.is_empty() {
                None
            } else {
                Some(requires_dist.iter().map(|s| s.to_string()).collect())
            },
        },
        releases,
    }
}

impl Registry for MockRegistry {
    fn project(&self, name: &str, _version: Option<&str>) -> Result<ProjectMetadata> {
        if self.failures.contains(name) {
            return Err(Error::DownloadError(format!(
                "simulated fetch failure for {name}"
            )));
        }

        self.projects
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFoundError(format!("package {name} not in registry")))
    }
}
