// src/requirement.rs

//! Dependency requirement expression parsing
//!
//! Registry metadata reports dependencies as PEP-508-style requirement
//! strings (`requests (>=2.18.4) ; extra == 'security'`). Recipes pin a
//! single version per package, so the full constraint language collapses to
//! one decision: `==` and `<=` pin the literal version, everything else
//! resolves to the registry's current release. Only the `extra == '<tag>'`
//! marker shape is recognized; any other environment marker is ignored.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

/// One parsed dependency of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Registry package identifier
    pub name: String,
    /// Resolved target version, or `None` for "fetch current release"
    pub version: Option<String>,
    /// Conditional-feature tag; `None` means always required
    pub extra: Option<String>,
}

impl Dependency {
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        extra: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            extra,
        }
    }

    /// Dependency on the current release of `name`, with no extra tag
    pub fn unconstrained(name: impl Into<String>) -> Self {
        Self::new(name, None, None)
    }
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*").unwrap())
}

fn version_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Longest operators first so `==` does not shadow `===`
    RE.get_or_init(|| Regex::new(r"(===|==|>=|<=|~=|!=|<|>)\s*([^,()\s;]+)").unwrap())
}

fn extra_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^extra\s*==\s*['"]([^'"]*)['"]$"#).unwrap())
}

/// Parse one requirement expression into a [`Dependency`]
///
/// Fails with [`Error::ParseError`] when the expression does not conform to
/// the expected grammar; the resolver treats that as a per-node failure, not
/// as fatal to the whole run.
pub fn parse_requirement(expr: &str) -> Result<Dependency> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(Error::ParseError("empty requirement expression".to_string()));
    }

    // The environment marker, if any, follows the first semicolon.
    let (spec, marker) = match expr.split_once(';') {
        Some((spec, marker)) => (spec.trim(), Some(marker.trim())),
        None => (expr, None),
    };

    let name_match = name_re()
        .find(spec)
        .ok_or_else(|| Error::ParseError(format!("malformed requirement: {expr}")))?;
    let name = name_match.as_str().to_string();

    let mut rest = spec[name_match.end()..].trim_start();

    // Requested extras of the dependency itself ("requests[security]") are
    // not carried into recipes; the bracket only has to parse.
    if let Some(stripped) = rest.strip_prefix('[') {
        let close = stripped
            .find(']')
            .ok_or_else(|| Error::ParseError(format!("unterminated extras bracket: {expr}")))?;
        rest = stripped[close + 1..].trim_start();
    }

    if !rest.is_empty() {
        if !rest.starts_with(['(', '<', '>', '=', '!', '~']) {
            return Err(Error::ParseError(format!("malformed requirement: {expr}")));
        }
        if rest.starts_with('(') && !rest.contains(')') {
            return Err(Error::ParseError(format!("unterminated version spec: {expr}")));
        }
    }

    Ok(Dependency::new(name, decide_version(rest), decide_extra(marker)))
}

/// Collapse a version-constraint clause list to a single resolved target
///
/// Only the first clause is considered. `==` pins the literal; `<=` is
/// also treated as a pin to the literal; `>=` and every other operator
/// (including `===`) resolve to the registry's current release.
fn decide_version(spec: &str) -> Option<String> {
    let captures = version_clause_re().captures(spec)?;
    let relation = captures.get(1).map(|m| m.as_str())?;
    let version = captures.get(2).map(|m| m.as_str())?;

    match relation {
        "==" | "<=" => Some(version.to_string()),
        _ => None,
    }
}

/// Extract the conditional-extra tag from an environment marker
///
/// Recognizes `extra == '<tag>'`, alone or combined with other clauses via
/// `and`. Markers referencing any other condition yield no tag.
fn decide_extra(marker: Option<&str>) -> Option<String> {
    let marker = marker?;
    marker
        .split(" and ")
        .map(str::trim)
        .find_map(|clause| {
            extra_clause_re()
                .captures(clause)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
}
