// src/commands.rs

//! Command handler for the pybake CLI
//!
//! Wires the CLI surface to the resolver and renderer. Node-local
//! resolution failures never reach this layer; everything that does is
//! run-fatal and exits non-zero through `main`.

use crate::artifact::HttpArtifactSource;
use crate::cli::Cli;
use crate::license::{LicenseFallback, LicenseMap};
use crate::registry::RegistryClient;
use crate::render;
use crate::resolver::{ResolutionSet, Resolver, ResolveOptions};
use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use std::path::Path;

/// License map dump file name (with `--licenses`)
const LICENSE_DUMP_FILE: &str = "licenses.json";

/// Resolve the requested packages and generate recipes plus the manifest
pub fn generate(args: &Cli) -> Result<()> {
    if args.package.is_none() && args.requirements.is_none() {
        bail!("No packages provided: pass --package or --requirements");
    }

    let registry = RegistryClient::new()?;
    let artifacts = HttpArtifactSource::new()?;

    let fallback = match &args.default_license {
        Some(license) => LicenseFallback::Default(license.clone()),
        None => LicenseFallback::Ask(Box::new(prompt_license)),
    };

    let mut resolver = Resolver::new(
        &registry,
        &artifacts,
        LicenseMap::builtin(fallback),
        ResolveOptions {
            follow_extras: args.extras,
        },
    );

    let mut set = ResolutionSet::new();

    println!("Gathering info:");
    if let Some(requirements) = &args.requirements {
        resolve_requirements(&mut resolver, &mut set, requirements)?;
    } else if let Some(package) = &args.package {
        resolver.resolve_into(&mut set, package, args.version.as_deref());
    }

    println!("Generating recipes:");
    render::write_recipes(set.packages(), &args.outdir, &args.runtime, args.extras)?;
    let version_file =
        render::write_preferred_versions(set.packages(), &args.outdir, &args.runtime)?;

    println!();
    if args.licenses {
        let license_file = args.outdir.join(LICENSE_DUMP_FILE);
        resolver.licenses().dump(&license_file)?;
        println!(
            "License mappings are available in: {}",
            license_file.display()
        );
    }
    println!(
        "PREFERRED_VERSIONS are available in: {}",
        version_file.display()
    );

    Ok(())
}

/// How one requirements-file line is handled
#[derive(Debug, Clone, PartialEq, Eq)]
enum RequirementLine {
    Empty,
    /// Editable-install or local-path line, skipped with a notice
    Skip,
    /// Shape not understood, reported and skipped
    Unparsed,
    Root {
        name: String,
        version: Option<String>,
    },
}

/// Classify one line of a requirements file
///
/// Accepted shapes are `name` and `name==version`; lines starting with the
/// editable-install marker `-e` or a local path `.` are skipped.
fn classify_requirement_line(line: &str) -> RequirementLine {
    let line = line.trim();
    if line.is_empty() {
        return RequirementLine::Empty;
    }
    if line.starts_with("-e") || line.starts_with('.') {
        return RequirementLine::Skip;
    }

    let parts: Vec<&str> = line.split("==").map(str::trim).collect();
    match parts.as_slice() {
        [name] => RequirementLine::Root {
            name: name.to_string(),
            version: None,
        },
        [name, version] => RequirementLine::Root {
            name: name.to_string(),
            version: Some(version.to_string()),
        },
        _ => RequirementLine::Unparsed,
    }
}

/// Resolve every root named by a requirements file into one shared set
fn resolve_requirements(
    resolver: &mut Resolver<'_>,
    set: &mut ResolutionSet,
    path: &Path,
) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read requirements file {}", path.display()))?;

    for line in contents.lines() {
        match classify_requirement_line(line) {
            RequirementLine::Empty => {}
            RequirementLine::Skip => println!("    Skipping: {}", line.trim()),
            RequirementLine::Unparsed => println!("    Unparsed package: {}", line.trim()),
            RequirementLine::Root { name, version } => {
                resolver.resolve_into(set, &name, version.as_deref());
            }
        }
    }

    Ok(())
}

/// Terminal prompt used as the license fallback when no default is set
fn prompt_license(raw: &str) -> Option<String> {
    println!("Failed to translate license: {raw}");
    print!("Please enter a valid license name: ");
    io::stdout().flush().ok()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line).ok()?;
    let line = line.trim();
    (!line.is_empty()).then(|| line.to_string())
}
