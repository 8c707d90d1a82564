// src/artifact.rs

//! Source artifact retrieval and integrity data
//!
//! Turns a source URI into verified checksums and a located license file:
//! download to a private scratch path, extract, scan for a license, hash,
//! and clean up. Scratch state is removed on every exit path; only a
//! whole-process interrupt may leave residue behind.

use crate::archive::{self, ArchiveFormat};
use crate::error::{Error, Result};
use crate::hash::{self, HashAlgorithm};
use crate::registry::RegistryClient;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Filename assumed to hold license terms when no license file is found
const LICENSE_FALLBACK_FILE: &str = "setup.py";

/// Integrity data for one retrieved source artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    /// MD5 of the archive bytes
    pub src_md5: String,
    /// SHA-256 of the archive bytes
    pub src_sha256: String,
    /// Single top-level directory name inside the extracted archive
    pub src_dir: String,
    /// License file path relative to `src_dir`
    pub license_file: String,
    /// MD5 of the license file bytes
    pub license_md5: String,
    /// False when `license_file` is the fallback, not a real license hit
    pub license_found: bool,
}

/// Source-artifact retrieval seam
///
/// The resolver depends on this trait so tests can substitute canned
/// integrity data for the download-extract-hash pipeline.
pub trait ArtifactSource {
    /// Retrieve and verify the archive at `src_uri`
    fn fetch_and_verify(&self, name: &str, version: &str, src_uri: &str) -> Result<ArtifactInfo>;
}

/// Removes scratch state when dropped, regardless of exit path
struct ScratchGuard {
    archive: PathBuf,
    extract_dir: PathBuf,
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.archive);
        let _ = fs::remove_file(self.archive.with_extension("tmp"));
        let _ = fs::remove_dir_all(&self.extract_dir);
    }
}

/// Production [`ArtifactSource`] downloading over HTTP
pub struct HttpArtifactSource {
    client: RegistryClient,
    show_progress: bool,
}

impl HttpArtifactSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: RegistryClient::new()?,
            show_progress: true,
        })
    }

    /// Disable the per-download progress bar
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn progress_bar(&self, name: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        pb.set_message(name.to_string());
        Some(pb)
    }
}

impl ArtifactSource for HttpArtifactSource {
    fn fetch_and_verify(&self, name: &str, version: &str, src_uri: &str) -> Result<ArtifactInfo> {
        let format = ArchiveFormat::from_uri(src_uri)
            .ok_or_else(|| Error::UnsupportedFormat(src_uri.to_string()))?;

        let archive = std::env::temp_dir().join(format!("{name}_{version}.{}", format.extension()));
        let extract_dir = scratch_extract_dir(&archive);

        // A prior failed run may have left a stale download behind; never
        // silently reuse it.
        if archive.exists() {
            fs::remove_file(&archive).map_err(|e| {
                Error::IoError(format!(
                    "Failed to remove stale download {}: {e}",
                    archive.display()
                ))
            })?;
        }

        let _guard = ScratchGuard {
            archive: archive.clone(),
            extract_dir: extract_dir.clone(),
        };

        let progress = self.progress_bar(name);
        let result = self.client.download_file(src_uri, &archive, progress.as_ref());
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        result?;

        examine_archive(&archive, format, &extract_dir)
    }
}

/// Scratch extraction directory next to the scratch archive
fn scratch_extract_dir(archive: &Path) -> PathBuf {
    let mut name = archive.as_os_str().to_os_string();
    name.push(".d");
    PathBuf::from(name)
}

/// Extract an archive and gather its integrity data
///
/// Expects exactly one top-level directory in the extracted tree. The
/// caller owns cleanup of both the archive and `extract_dir`.
fn examine_archive(
    archive: &Path,
    format: ArchiveFormat,
    extract_dir: &Path,
) -> Result<ArtifactInfo> {
    archive::unpack(archive, format, extract_dir)?;

    let mut entries = Vec::new();
    let listing = fs::read_dir(extract_dir).map_err(|e| {
        Error::IoError(format!("Failed to list {}: {e}", extract_dir.display()))
    })?;
    for entry in listing {
        entries.push(entry.map_err(|e| {
            Error::IoError(format!("Failed to list {}: {e}", extract_dir.display()))
        })?);
    }

    if entries.len() != 1 {
        return Err(Error::ExtractError(format!(
            "expected exactly one top-level entry in archive, found {}",
            entries.len()
        )));
    }

    let top = &entries[0];
    let src_dir_path = top.path();
    if !src_dir_path.is_dir() {
        return Err(Error::ExtractError(format!(
            "top-level archive entry {} is not a directory",
            top.file_name().to_string_lossy()
        )));
    }
    let src_dir = top.file_name().to_string_lossy().into_owned();

    let (license_file, license_found) = locate_license(&src_dir_path)?;
    if !license_found {
        warn!(
            "No license file found in {}, falling back to {}",
            src_dir, LICENSE_FALLBACK_FILE
        );
    } else {
        debug!("License file for {}: {}", src_dir, license_file);
    }

    let license_path = src_dir_path.join(&license_file);
    let license_md5 = hash::hash_file(HashAlgorithm::Md5, &license_path).map_err(|e| {
        Error::IoError(format!(
            "Failed to hash license file {}: {e}",
            license_path.display()
        ))
    })?;

    let checksums = hash::checksum_pair_file(archive).map_err(|e| {
        Error::IoError(format!("Failed to hash archive {}: {e}", archive.display()))
    })?;

    Ok(ArtifactInfo {
        src_md5: checksums.md5,
        src_sha256: checksums.sha256,
        src_dir,
        license_file,
        license_md5,
        license_found,
    })
}

/// Find a license file among the immediate entries of `dir`
///
/// Scans files (directories excluded) case-insensitively for a name
/// containing "license" or "copying"; the first match in directory-listing
/// order wins. Returns the fallback filename and `false` when nothing
/// matches.
fn locate_license(dir: &Path) -> Result<(String, bool)> {
    let listing = fs::read_dir(dir)
        .map_err(|e| Error::IoError(format!("Failed to list {}: {e}", dir.display())))?;

    for entry in listing {
        let entry = entry
            .map_err(|e| Error::IoError(format!("Failed to list {}: {e}", dir.display())))?;
        let file_type = entry
            .file_type()
            .map_err(|e| Error::IoError(format!("Failed to stat {}: {e}", dir.display())))?;
        if file_type.is_dir() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        let lower = file_name.to_lowercase();
        if lower.contains("license") || lower.contains("copying") {
            return Ok((file_name, true));
        }
    }

    Ok((LICENSE_FALLBACK_FILE.to_string(), false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash;
    use std::fs::File;
    use std::io::Write;

    /// Build a gzip tarball at `path` containing `root/` with the given files
    fn build_archive(path: &Path, root: &str, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, format!("{root}/{name}"), *content)
                .unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap().flush().unwrap();
    }

    #[test]
    fn test_examine_archive_happy_path() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("alpha_1.0.tar.gz");
        build_archive(
            &archive,
            "alpha-1.0",
            &[("LICENSE.txt", b"MIT\n"), ("setup.py", b"setup()\n")],
        );

        let extract = dir.path().join("alpha_1.0.tar.gz.d");
        let info = examine_archive(&archive, ArchiveFormat::TarGz, &extract).unwrap();

        assert_eq!(info.src_dir, "alpha-1.0");
        assert_eq!(info.license_file, "LICENSE.txt");
        assert!(info.license_found);
        assert_eq!(info.license_md5, hash::md5(b"MIT\n"));

        // Checksum round-trip: recomputing over the retained archive bytes
        // matches the captured values.
        let pair = hash::checksum_pair_file(&archive).unwrap();
        assert_eq!(info.src_md5, pair.md5);
        assert_eq!(info.src_sha256, pair.sha256);
    }

    #[test]
    fn test_examine_archive_copying_variant() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("beta_2.0.tar.gz");
        build_archive(&archive, "beta-2.0", &[("COPYING", b"GPLv2\n")]);

        let extract = dir.path().join("beta_2.0.tar.gz.d");
        let info = examine_archive(&archive, ArchiveFormat::TarGz, &extract).unwrap();
        assert_eq!(info.license_file, "COPYING");
        assert!(info.license_found);
    }

    #[test]
    fn test_examine_archive_license_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("gamma_0.1.tar.gz");
        build_archive(
            &archive,
            "gamma-0.1",
            &[("setup.py", b"setup()\n"), ("README", b"docs\n")],
        );

        let extract = dir.path().join("gamma_0.1.tar.gz.d");
        let info = examine_archive(&archive, ArchiveFormat::TarGz, &extract).unwrap();

        assert_eq!(info.license_file, "setup.py");
        assert!(!info.license_found);
        assert_eq!(info.license_md5, hash::md5(b"setup()\n"));
    }

    #[test]
    fn test_examine_archive_fallback_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("delta_0.1.tar.gz");
        build_archive(&archive, "delta-0.1", &[("README", b"docs\n")]);

        let extract = dir.path().join("delta_0.1.tar.gz.d");
        let err = examine_archive(&archive, ArchiveFormat::TarGz, &extract).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn test_examine_archive_multiple_top_level_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("multi_1.0.tar.gz");

        let file = File::create(&archive).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for root in ["one", "two"] {
            let mut header = tar::Header::new_gnu();
            header.set_size(2);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, format!("{root}/f"), &b"x\n"[..])
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap().flush().unwrap();

        let extract = dir.path().join("multi_1.0.tar.gz.d");
        let err = examine_archive(&archive, ArchiveFormat::TarGz, &extract).unwrap_err();
        assert!(matches!(err, Error::ExtractError(_)));
    }

    #[test]
    fn test_scratch_guard_removes_state() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg_1.0.tar.gz");
        let extract = dir.path().join("pkg_1.0.tar.gz.d");
        let partial = archive.with_extension("tmp");

        std::fs::write(&archive, b"archive").unwrap();
        std::fs::write(&partial, b"partial").unwrap();
        std::fs::create_dir_all(extract.join("inner")).unwrap();

        drop(ScratchGuard {
            archive: archive.clone(),
            extract_dir: extract.clone(),
        });

        assert!(!archive.exists());
        assert!(!partial.exists());
        assert!(!extract.exists());
    }

    #[test]
    fn test_scratch_extract_dir_keeps_full_extension() {
        let dir = scratch_extract_dir(Path::new("/tmp/alpha_1.0.tar.gz"));
        assert_eq!(dir, Path::new("/tmp/alpha_1.0.tar.gz.d"));
    }

    #[test]
    fn test_unsupported_format_rejected_before_download() {
        let source = HttpArtifactSource::new().unwrap().quiet();
        let err = source
            .fetch_and_verify("alpha", "1.0", "https://files.example.org/alpha-1.0.whl")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
