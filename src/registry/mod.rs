// src/registry/mod.rs

//! Package registry access
//!
//! The resolver talks to the registry through the [`Registry`] trait so
//! tests can substitute a deterministic in-memory implementation.
//! [`RegistryClient`] is the production implementation against the PyPI
//! JSON API; [`mock::MockRegistry`] serves canned metadata.

mod client;
mod metadata;

pub mod mock;

pub use client::{RegistryClient, DEFAULT_REGISTRY_URL};
pub use metadata::{ProjectInfo, ProjectMetadata, ReleaseFile, SDIST_PACKAGE_TYPE};

use crate::error::Result;

/// Read access to per-package registry metadata
pub trait Registry {
    /// Fetch metadata for `name`, optionally for an exact `version`
    ///
    /// With no version, the returned metadata describes the registry's
    /// current release. Missing packages and transport failures are both
    /// node-local at the resolver boundary.
    fn project(&self, name: &str, version: Option<&str>) -> Result<ProjectMetadata>;
}
