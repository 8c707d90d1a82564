// tests/common/mod.rs

//! Shared test doubles for resolver integration tests
//!
//! The mock artifact source derives deterministic integrity data from its
//! inputs, so end-to-end runs are reproducible without touching the
//! network or the filesystem's temp area.

#![allow(dead_code)]

use pybake::{hash, ArtifactInfo, ArtifactSource, Error};
use std::cell::RefCell;
use std::collections::HashSet;

/// Canned [`ArtifactSource`] with per-package failure injection
#[derive(Default)]
pub struct MockArtifacts {
    failures: HashSet<String>,
    fetched: RefCell<Vec<String>>,
}

impl MockArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every fetch of `name` fail with a download error
    pub fn fail(mut self, name: &str) -> Self {
        self.failures.insert(name.to_string());
        self
    }

    /// `name-version` labels of every successful fetch, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl ArtifactSource for MockArtifacts {
    fn fetch_and_verify(
        &self,
        name: &str,
        version: &str,
        src_uri: &str,
    ) -> pybake::Result<ArtifactInfo> {
        if self.failures.contains(name) {
            return Err(Error::DownloadError(format!(
                "simulated download failure for {name}"
            )));
        }

        self.fetched.borrow_mut().push(format!("{name}-{version}"));

        Ok(ArtifactInfo {
            src_md5: hash::md5(src_uri.as_bytes()),
            src_sha256: hash::sha256(src_uri.as_bytes()),
            src_dir: format!("{name}-{version}"),
            license_file: "LICENSE".to_string(),
            license_md5: hash::md5(name.as_bytes()),
            license_found: true,
        })
    }
}
