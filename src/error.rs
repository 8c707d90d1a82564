// src/error.rs

//! Crate-wide error and result types
//!
//! Errors are split into two tiers at the resolver boundary: node-local
//! failures (parse, download, extract, license) abort only the package
//! being resolved, while I/O failures on the output directory are
//! propagated to the top level and abort the run.

use thiserror::Error;

/// Errors produced while resolving packages and generating recipes
#[derive(Error, Debug)]
pub enum Error {
    /// A requirement expression did not conform to the expected grammar
    #[error("parse error: {0}")]
    ParseError(String),

    /// Network transport or HTTP-level failure
    #[error("download error: {0}")]
    DownloadError(String),

    /// A package, version, or source distribution was not found
    #[error("not found: {0}")]
    NotFoundError(String),

    /// Archive could not be unpacked
    #[error("extract error: {0}")]
    ExtractError(String),

    /// Source URI carries an unrecognized archive extension
    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    IoError(String),

    /// A raw license string could not be mapped to a canonical identifier
    #[error("license error: {0}")]
    LicenseError(String),

    /// Package metadata was unusable for resolution
    #[error("resolution error: {0}")]
    ResolutionError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
