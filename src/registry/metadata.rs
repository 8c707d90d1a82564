// src/registry/metadata.rs

//! Registry wire format data structures
//!
//! Shapes match the PyPI JSON API (`/pypi/{name}/json` and
//! `/pypi/{name}/{version}/json`). Every descriptive field may be null in
//! the wild, so everything except the package name and version is optional.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Packaging-type tag identifying a source distribution
pub const SDIST_PACKAGE_TYPE: &str = "sdist";

/// Full metadata record for one package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub info: ProjectInfo,
    /// Release files per version string
    #[serde(default)]
    pub releases: HashMap<String, Vec<ReleaseFile>>,
}

impl ProjectMetadata {
    /// Find the source distribution entry for `version`, if any
    pub fn sdist_for(&self, version: &str) -> Option<&ReleaseFile> {
        self.releases
            .get(version)?
            .iter()
            .find(|f| f.packagetype == SDIST_PACKAGE_TYPE)
    }
}

/// Descriptive package metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    /// Current release version
    pub version: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub home_page: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    /// Raw dependency requirement expressions
    #[serde(default)]
    pub requires_dist: Option<Vec<String>>,
}

/// One downloadable file of a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseFile {
    /// Packaging-type tag ("sdist", "bdist_wheel", ...)
    pub packagetype: String,
    /// Download URI
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_nulls() {
        let json = r#"{
            "info": {
                "name": "alpha",
                "version": "1.2.0",
                "summary": null,
                "home_page": null,
                "author": "Jo",
                "author_email": null,
                "license": null,
                "requires_dist": null
            },
            "releases": {
                "1.2.0": [
                    {"packagetype": "bdist_wheel", "url": "https://example.org/alpha-1.2.0.whl"},
                    {"packagetype": "sdist", "url": "https://example.org/alpha-1.2.0.tar.gz"}
                ]
            }
        }"#;

        let meta: ProjectMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.info.name, "alpha");
        assert_eq!(meta.info.version, "1.2.0");
        assert_eq!(meta.info.summary, None);
        assert_eq!(meta.info.author.as_deref(), Some("Jo"));

        let sdist = meta.sdist_for("1.2.0").unwrap();
        assert!(sdist.url.ends_with(".tar.gz"));
    }

    #[test]
    fn test_sdist_for_missing_version() {
        let json = r#"{
            "info": {"name": "alpha", "version": "1.0"},
            "releases": {"1.0": [{"packagetype": "bdist_wheel", "url": "u"}]}
        }"#;

        let meta: ProjectMetadata = serde_json::from_str(json).unwrap();
        assert!(meta.sdist_for("1.0").is_none());
        assert!(meta.sdist_for("9.9").is_none());
    }

    #[test]
    fn test_missing_releases_defaults_empty() {
        let json = r#"{"info": {"name": "alpha", "version": "1.0"}}"#;
        let meta: ProjectMetadata = serde_json::from_str(json).unwrap();
        assert!(meta.releases.is_empty());
    }
}
