// src/license.rs

//! License string normalization
//!
//! Registry metadata reports licenses as free-form strings ("MIT License",
//! "Apache Software License", ...); recipes need the canonical
//! OpenEmbedded identifier. A built-in translation table covers the common
//! cases. Unknown strings are handled by an injectable fallback strategy so
//! batch runs never block on a terminal prompt.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Built-in raw-license → canonical-identifier translations
const BUILTIN_LICENSES: &[(&str, &str)] = &[
    ("MIT", "MIT"),
    ("MIT License", "MIT"),
    ("MIT license", "MIT"),
    ("MIT licence", "MIT"),
    ("Expat license", "MIT"),
    ("BSD", "BSD"),
    ("BSD License", "BSD"),
    ("BSD license", "BSD"),
    ("BSD-like", "BSD"),
    ("new BSD", "BSD-3-Clause"),
    ("New BSD License", "BSD-3-Clause"),
    ("3-clause BSD", "BSD-3-Clause"),
    ("BSD 3-Clause", "BSD-3-Clause"),
    ("BSD 3-Clause License", "BSD-3-Clause"),
    ("BSD-3-Clause", "BSD-3-Clause"),
    ("BSD 2-Clause", "BSD-2-Clause"),
    ("BSD-2-Clause", "BSD-2-Clause"),
    ("Apache", "Apache-2.0"),
    ("Apache 2", "Apache-2.0"),
    ("Apache 2.0", "Apache-2.0"),
    ("Apache-2.0", "Apache-2.0"),
    ("Apache License", "Apache-2.0"),
    ("Apache License 2.0", "Apache-2.0"),
    ("Apache License, Version 2.0", "Apache-2.0"),
    ("Apache License Version 2.0", "Apache-2.0"),
    ("Apache Software License", "Apache-2.0"),
    ("Apache Software License 2.0", "Apache-2.0"),
    ("GPL", "GPLv2"),
    ("GPLv2", "GPLv2"),
    ("GPL v2", "GPLv2"),
    ("GPL-2.0", "GPLv2"),
    ("GPLv2+", "GPLv2+"),
    ("GPLv3", "GPLv3"),
    ("GPL v3", "GPLv3"),
    ("GPL-3.0", "GPLv3"),
    ("GPLv3+", "GPLv3+"),
    ("GNU GPL v3", "GPLv3"),
    ("GNU General Public License v2 (GPLv2)", "GPLv2"),
    ("GNU General Public License v3 (GPLv3)", "GPLv3"),
    ("LGPL", "LGPLv2.1"),
    ("LGPLv2", "LGPLv2"),
    ("LGPLv2.1", "LGPLv2.1"),
    ("LGPL-2.1", "LGPLv2.1"),
    ("LGPLv3", "LGPLv3"),
    ("LGPL-3.0", "LGPLv3"),
    ("GNU LGPL", "LGPLv2.1"),
    ("GNU Lesser General Public License v2 (LGPLv2)", "LGPLv2"),
    ("GNU Lesser General Public License v3 (LGPLv3)", "LGPLv3"),
    ("MPL 2.0", "MPL-2.0"),
    ("MPL-2.0", "MPL-2.0"),
    ("Mozilla Public License 2.0 (MPL 2.0)", "MPL-2.0"),
    ("ISC", "ISC"),
    ("ISC License (ISCL)", "ISC"),
    ("ISC license", "ISC"),
    ("PSF", "PSF"),
    ("PSF License", "PSF"),
    ("Python Software Foundation License", "PSF"),
    ("ZPL", "ZPL-2.1"),
    ("ZPL 2.1", "ZPL-2.1"),
    ("Zope Public License", "ZPL-2.1"),
    ("zlib", "Zlib"),
    ("zlib/libpng license", "Zlib"),
    ("Public Domain", "PD"),
    ("Public domain", "PD"),
    ("Unlicense", "Unlicense"),
    ("The Unlicense", "Unlicense"),
    ("WTFPL", "WTFPL"),
    ("CC0", "CC0-1.0"),
    ("CC0 1.0 Universal", "CC0-1.0"),
    ("AGPLv3", "AGPLv3"),
    ("AGPLv3+", "AGPLv3+"),
    ("Dual License", "MIT"),
];

/// Strategy applied when a raw license string has no table entry
pub enum LicenseFallback {
    /// Use the raw string as-is, with spaces replaced by `-`
    UseRaw,
    /// Use a configured default identifier
    Default(String),
    /// Fail the node being resolved
    Fail,
    /// Ask an injected callback for a mapping; `None` fails the node
    Ask(Box<dyn Fn(&str) -> Option<String>>),
}

impl fmt::Debug for LicenseFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseRaw => write!(f, "UseRaw"),
            Self::Default(license) => write!(f, "Default({license:?})"),
            Self::Fail => write!(f, "Fail"),
            Self::Ask(_) => write!(f, "Ask(..)"),
        }
    }
}

/// Mutable raw → canonical license translation table
#[derive(Debug)]
pub struct LicenseMap {
    table: HashMap<String, String>,
    fallback: LicenseFallback,
}

impl LicenseMap {
    /// Create a map seeded with the built-in translations
    pub fn builtin(fallback: LicenseFallback) -> Self {
        let table = BUILTIN_LICENSES
            .iter()
            .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
            .collect();
        Self { table, fallback }
    }

    /// Create an empty map (tests and custom tables)
    pub fn empty(fallback: LicenseFallback) -> Self {
        Self {
            table: HashMap::new(),
            fallback,
        }
    }

    /// Insert or replace a translation
    pub fn insert(&mut self, raw: impl Into<String>, canonical: impl Into<String>) {
        self.table.insert(raw.into(), canonical.into());
    }

    /// Translate a raw registry license string to a canonical identifier
    ///
    /// On a table miss the configured fallback decides. A mapping learned
    /// through the `Ask` callback is inserted into the table so later
    /// lookups of the same raw string succeed without asking again.
    pub fn normalize(&mut self, raw: &str) -> Result<String> {
        if let Some(canonical) = self.table.get(raw) {
            return Ok(canonical.clone());
        }

        match &self.fallback {
            LicenseFallback::UseRaw => Ok(raw.replace(' ', "-")),
            LicenseFallback::Default(license) => Ok(license.clone()),
            LicenseFallback::Fail => Err(Error::LicenseError(format!(
                "no mapping for license: {raw:?}"
            ))),
            LicenseFallback::Ask(callback) => match callback(raw) {
                Some(canonical) => {
                    self.table.insert(raw.to_string(), canonical.clone());
                    Ok(canonical)
                }
                None => Err(Error::LicenseError(format!(
                    "no mapping provided for license: {raw:?}"
                ))),
            },
        }
    }

    /// Number of known translations
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Serialize the current table as pretty JSON, keys sorted
    pub fn to_json(&self) -> String {
        let sorted: std::collections::BTreeMap<&str, &str> = self
            .table
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        // BTreeMap serialization cannot fail
        serde_json::to_string_pretty(&sorted).unwrap_or_default()
    }

    /// Write the current table to `path` as JSON
    pub fn dump(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()).map_err(|e| {
            Error::IoError(format!(
                "Failed to write license map {}: {e}",
                path.display()
            ))
        })
    }
}
