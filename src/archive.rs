// src/archive.rs

//! Source archive format detection and extraction
//!
//! PyPI source distributions arrive as tarballs (optionally gzip, bzip2, or
//! xz compressed) or zip files. The format is inferred from the source URI's
//! file extension; URIs with an unrecognized extension are rejected before
//! any download happens.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Supported source archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Uncompressed tarball (.tar)
    Tar,
    /// Gzip-compressed tarball (.tar.gz)
    TarGz,
    /// Bzip2-compressed tarball (.tar.bz2)
    TarBz2,
    /// XZ-compressed tarball (.tar.xz)
    TarXz,
    /// Zip archive (.zip)
    Zip,
}

impl ArchiveFormat {
    /// Detect the archive format from a source URI's file extension
    ///
    /// Compressed tarball extensions are checked before the bare `.tar`
    /// suffix so `.tar.gz` is not misclassified.
    pub fn from_uri(uri: &str) -> Option<Self> {
        if uri.ends_with(".tar.gz") {
            Some(Self::TarGz)
        } else if uri.ends_with(".tar.bz2") {
            Some(Self::TarBz2)
        } else if uri.ends_with(".tar.xz") {
            Some(Self::TarXz)
        } else if uri.ends_with(".tar") {
            Some(Self::Tar)
        } else if uri.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }

    /// File extension for this format, without a leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
            Self::Zip => "zip",
        }
    }

    /// Human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "gzip tarball",
            Self::TarBz2 => "bzip2 tarball",
            Self::TarXz => "xz tarball",
            Self::Zip => "zip",
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Unpack an archive into `dest`
///
/// Any pre-existing directory at `dest` is removed first, so stale state
/// from a previously interrupted run cannot leak into the extracted tree.
pub fn unpack(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<()> {
    if dest.exists() {
        fs::remove_dir_all(dest).map_err(|e| {
            Error::IoError(format!(
                "Failed to remove stale extraction dir {}: {e}",
                dest.display()
            ))
        })?;
    }
    fs::create_dir_all(dest).map_err(|e| {
        Error::IoError(format!(
            "Failed to create extraction dir {}: {e}",
            dest.display()
        ))
    })?;

    let file = File::open(archive)
        .map_err(|e| Error::IoError(format!("Failed to open {}: {e}", archive.display())))?;

    match format {
        ArchiveFormat::Tar => unpack_tar(file, dest),
        ArchiveFormat::TarGz => unpack_tar(flate2::read::GzDecoder::new(file), dest),
        ArchiveFormat::TarBz2 => unpack_tar(bzip2::read::BzDecoder::new(file), dest),
        ArchiveFormat::TarXz => unpack_tar(xz2::read::XzDecoder::new(file), dest),
        ArchiveFormat::Zip => unpack_zip(file, dest),
    }
}

fn unpack_tar<R: Read>(reader: R, dest: &Path) -> Result<()> {
    tar::Archive::new(reader)
        .unpack(dest)
        .map_err(|e| Error::ExtractError(format!("Failed to unpack tarball: {e}")))
}

fn unpack_zip(file: File, dest: &Path) -> Result<()> {
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| Error::ExtractError(format!("Failed to read zip archive: {e}")))?;
    zip.extract(dest)
        .map_err(|e| Error::ExtractError(format!("Failed to unpack zip archive: {e}")))
}
