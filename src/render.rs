// src/render.rs

//! Recipe and manifest rendering
//!
//! Pure functions map a resolved [`Package`] (or a synthetic extras group)
//! to recipe text; thin wrappers write the files. Fields are inserted
//! verbatim with no escaping, which matches the recipe dialect's
//! expectations; rendering the same input twice produces byte-identical
//! output.

use crate::error::{Error, Result};
use crate::requirement::Dependency;
use crate::resolver::Package;
use std::fs;
use std::path::{Path, PathBuf};

/// Recipe file extension
const RECIPE_EXTENSION: &str = "bb";

/// Normalize a registry package name to a recipe name token
///
/// Lower-case, with `_` and `.` both mapped to `-`.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(['_', '.'], "-")
}

/// Deterministic recipe file name: `{runtime}-{normalized}_{version}.bb`
pub fn recipe_file_name(runtime: &str, name: &str, version: &str) -> String {
    format!(
        "{}-{}_{}.{}",
        runtime,
        normalize_name(name),
        version,
        RECIPE_EXTENSION
    )
}

/// Manifest file name: `{runtime}-versions.inc`
pub fn versions_file_name(runtime: &str) -> String {
    format!("{runtime}-versions.inc")
}

/// Space-joined dependency tokens, each `{runtime}-{normalized}`
fn dependency_tokens(dependencies: &[Dependency], runtime: &str) -> String {
    dependencies
        .iter()
        .map(|dep| format!("{}-{}", runtime, normalize_name(&dep.name)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one package recipe
pub fn render_recipe(package: &Package, runtime: &str) -> String {
    format!(
        r#"
SUMMARY = "{summary}"
HOMEPAGE = "{homepage}"
AUTHOR = "{author} <{author_email}>"
LICENSE = "{license}"
LIC_FILES_CHKSUM = "file://{license_file};md5={license_md5}"

SRC_URI = "{src_uri}"
SRC_URI[md5sum] = "{src_md5}"
SRC_URI[sha256sum] = "{src_sha256}"

S = "${{WORKDIR}}/{src_dir}"

RDEPENDS_${{PN}} = "{dependencies}"

inherit setuptools{setuptools}
"#,
        summary = package.summary,
        homepage = package.homepage,
        author = package.author,
        author_email = package.author_email,
        license = package.license,
        license_file = package.license_file,
        license_md5 = package.license_md5,
        src_uri = package.src_uri,
        src_md5 = package.src_md5,
        src_sha256 = package.src_sha256,
        src_dir = package.src_dir,
        dependencies = dependency_tokens(&package.dependencies, runtime),
        setuptools = if runtime == "python3" { "3" } else { "" },
    )
}

/// One conditional-feature bundle of a package
///
/// Synthesized at render time only; it has no source artifact of its own
/// and renders as a dependency-only grouping recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraGroup {
    /// `{base}-{tag}`
    pub name: String,
    /// Base package version, used for the recipe file name
    pub version: String,
    pub summary: String,
    pub homepage: String,
    pub author: String,
    pub author_email: String,
    /// The base package plus every dependency carrying the tag
    pub dependencies: Vec<Dependency>,
}

/// Synthesize one [`ExtraGroup`] per distinct extra tag of `package`
///
/// Tags appear in first-reference order so output is deterministic.
pub fn extra_groups(package: &Package) -> Vec<ExtraGroup> {
    let mut tags: Vec<&str> = Vec::new();
    for dep in &package.dependencies {
        if let Some(tag) = dep.extra.as_deref() {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }

    tags.into_iter()
        .map(|tag| {
            let mut dependencies =
                vec![Dependency::new(package.name.clone(), Some(package.version.clone()), None)];
            dependencies.extend(
                package
                    .dependencies
                    .iter()
                    .filter(|dep| dep.extra.as_deref() == Some(tag))
                    .map(|dep| Dependency::new(dep.name.clone(), dep.version.clone(), None)),
            );

            ExtraGroup {
                name: format!("{}-{}", package.name, tag),
                version: package.version.clone(),
                summary: package.summary.clone(),
                homepage: package.homepage.clone(),
                author: package.author.clone(),
                author_email: package.author_email.clone(),
                dependencies,
            }
        })
        .collect()
}

/// Render one extras grouping recipe (no source-fetch fields)
pub fn render_extra_recipe(group: &ExtraGroup, runtime: &str) -> String {
    format!(
        r#"
SUMMARY = "{summary}"
HOMEPAGE = "{homepage}"
AUTHOR = "{author} <{author_email}>"

RDEPENDS_${{PN}} = "{dependencies}"

inherit packagegroup
"#,
        summary = group.summary,
        homepage = group.homepage,
        author = group.author,
        author_email = group.author_email,
        dependencies = dependency_tokens(&group.dependencies, runtime),
    )
}

/// Render the preferred-versions manifest, one pin line per package in
/// resolution order
pub fn render_preferred_versions(packages: &[Package], runtime: &str) -> String {
    packages
        .iter()
        .map(|package| {
            format!(
                "PREFERRED_VERSION_{}-{} = \"{}\"",
                runtime,
                normalize_name(&package.name),
                package.version
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write one recipe file per package (and per extras group when enabled)
///
/// Returns the written paths. Output-directory I/O failures are run-fatal
/// and propagate to the caller.
pub fn write_recipes(
    packages: &[Package],
    outdir: &Path,
    runtime: &str,
    follow_extras: bool,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for package in packages {
        let basename = recipe_file_name(runtime, &package.name, &package.version);
        println!("  {basename}");
        let path = outdir.join(&basename);
        fs::write(&path, render_recipe(package, runtime))
            .map_err(|e| Error::IoError(format!("Failed to write {}: {e}", path.display())))?;
        written.push(path);

        if follow_extras {
            for group in extra_groups(package) {
                let basename = recipe_file_name(runtime, &group.name, &group.version);
                println!("  {basename}");
                let path = outdir.join(&basename);
                fs::write(&path, render_extra_recipe(&group, runtime)).map_err(|e| {
                    Error::IoError(format!("Failed to write {}: {e}", path.display()))
                })?;
                written.push(path);
            }
        }
    }

    Ok(written)
}

/// Write the preferred-versions manifest, returning its path
pub fn write_preferred_versions(
    packages: &[Package],
    outdir: &Path,
    runtime: &str,
) -> Result<PathBuf> {
    let path = outdir.join(versions_file_name(runtime));
    fs::write(&path, render_preferred_versions(packages, runtime))
        .map_err(|e| Error::IoError(format!("Failed to write {}: {e}", path.display())))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package() -> Package {
        Package {
            name: "Alpha_Pkg.core".to_string(),
            version: "1.2.0".to_string(),
            summary: "An example package".to_string(),
            homepage: "https://example.org/alpha".to_string(),
            author: "Jo Developer".to_string(),
            author_email: "jo@example.org".to_string(),
            license: "MIT".to_string(),
            license_file: "LICENSE.txt".to_string(),
            license_md5: "11111111111111111111111111111111".to_string(),
            src_dir: "alpha-1.2.0".to_string(),
            src_uri: "https://files.example.org/alpha-1.2.0.tar.gz".to_string(),
            src_md5: "22222222222222222222222222222222".to_string(),
            src_sha256: "3333333333333333333333333333333333333333333333333333333333333333"
                .to_string(),
            dependencies: vec![
                Dependency::unconstrained("beta"),
                Dependency::new("Gamma_Lib", Some("2.0".to_string()), None),
            ],
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Alpha_Pkg.core"), "alpha-pkg-core");
        assert_eq!(normalize_name("requests"), "requests");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
    }

    #[test]
    fn test_recipe_file_name() {
        assert_eq!(
            recipe_file_name("python", "Alpha_Pkg", "1.2.0"),
            "python-alpha-pkg_1.2.0.bb"
        );
        assert_eq!(versions_file_name("python3"), "python3-versions.inc");
    }

    #[test]
    fn test_render_recipe_exact() {
        let expected = r#"
SUMMARY = "An example package"
HOMEPAGE = "https://example.org/alpha"
AUTHOR = "Jo Developer <jo@example.org>"
LICENSE = "MIT"
LIC_FILES_CHKSUM = "file://LICENSE.txt;md5=11111111111111111111111111111111"

SRC_URI = "https://files.example.org/alpha-1.2.0.tar.gz"
SRC_URI[md5sum] = "22222222222222222222222222222222"
SRC_URI[sha256sum] = "3333333333333333333333333333333333333333333333333333333333333333"

S = "${WORKDIR}/alpha-1.2.0"

RDEPENDS_${PN} = "python-beta python-gamma-lib"

inherit setuptools
"#;
        assert_eq!(render_recipe(&sample_package(), "python"), expected);
    }

    #[test]
    fn test_render_recipe_python3_inherit() {
        let text = render_recipe(&sample_package(), "python3");
        assert!(text.ends_with("inherit setuptools3\n"));
        assert!(text.contains("RDEPENDS_${PN} = \"python3-beta python3-gamma-lib\""));
    }

    #[test]
    fn test_render_recipe_idempotent() {
        let package = sample_package();
        assert_eq!(
            render_recipe(&package, "python"),
            render_recipe(&package, "python")
        );
    }

    #[test]
    fn test_extra_groups_synthesis() {
        let mut package = sample_package();
        package.name = "alpha".to_string();
        package.dependencies = vec![
            Dependency::unconstrained("beta"),
            Dependency::new("pytest", None, Some("test".to_string())),
            Dependency::new("coverage", None, Some("test".to_string())),
            Dependency::new("sphinx", None, Some("docs".to_string())),
        ];

        let groups = extra_groups(&package);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].name, "alpha-test");
        let names: Vec<&str> = groups[0].dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["alpha", "pytest", "coverage"]);
        // Extra tags are stripped from the group's dependency list
        assert!(groups[0].dependencies.iter().all(|d| d.extra.is_none()));

        assert_eq!(groups[1].name, "alpha-docs");
        let names: Vec<&str> = groups[1].dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["alpha", "sphinx"]);
    }

    #[test]
    fn test_extra_groups_none_without_tags() {
        assert!(extra_groups(&sample_package()).is_empty());
    }

    #[test]
    fn test_render_extra_recipe() {
        let group = ExtraGroup {
            name: "alpha-test".to_string(),
            version: "1.2.0".to_string(),
            summary: "An example package".to_string(),
            homepage: "https://example.org/alpha".to_string(),
            author: "Jo Developer".to_string(),
            author_email: "jo@example.org".to_string(),
            dependencies: vec![
                Dependency::unconstrained("alpha"),
                Dependency::unconstrained("beta"),
            ],
        };

        let expected = r#"
SUMMARY = "An example package"
HOMEPAGE = "https://example.org/alpha"
AUTHOR = "Jo Developer <jo@example.org>"

RDEPENDS_${PN} = "python-alpha python-beta"

inherit packagegroup
"#;
        assert_eq!(render_extra_recipe(&group, "python"), expected);
    }

    #[test]
    fn test_render_preferred_versions() {
        let mut beta = sample_package();
        beta.name = "beta".to_string();
        beta.version = "0.9".to_string();
        let packages = vec![sample_package(), beta];

        let manifest = render_preferred_versions(&packages, "python");
        assert_eq!(
            manifest,
            "PREFERRED_VERSION_python-alpha-pkg-core = \"1.2.0\"\n\
             PREFERRED_VERSION_python-beta = \"0.9\""
        );
    }

    #[test]
    fn test_write_recipes_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let packages = vec![sample_package()];

        let written = write_recipes(&packages, dir.path(), "python", false).unwrap();
        assert_eq!(written.len(), 1);
        assert!(dir.path().join("python-alpha-pkg-core_1.2.0.bb").is_file());

        let manifest = write_preferred_versions(&packages, dir.path(), "python").unwrap();
        let contents = fs::read_to_string(manifest).unwrap();
        assert!(contents.starts_with("PREFERRED_VERSION_python-alpha-pkg-core"));
    }

    #[test]
    fn test_write_recipes_with_extras() {
        let dir = tempfile::tempdir().unwrap();
        let mut package = sample_package();
        package.name = "alpha".to_string();
        package.dependencies = vec![
            Dependency::unconstrained("beta"),
            Dependency::new("pytest", None, Some("test".to_string())),
        ];

        let written = write_recipes(&[package], dir.path(), "python", true).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("python-alpha_1.2.0.bb").is_file());
        assert!(dir.path().join("python-alpha-test_1.2.0.bb").is_file());
    }

    #[test]
    fn test_write_recipes_missing_outdir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = write_recipes(&[sample_package()], &missing, "python", false).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
