//! `trace.toml` project manifest (spec §4.9 "ADDED Configuration").
//!
//! Grounded in the teacher's `logicaffeine_cli::project::manifest::Manifest`
//! (a `[package]` table plus defaults), trimmed down to the handful of
//! fields a Trace project needs to supply defaults for: target, optimization
//! level, and the entry file for a multi-unit project. CLI flags always
//! override whatever a manifest supplies (spec §4.9).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The parsed `trace.toml` manifest, or its defaults if no file is present.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub package: Package,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    /// Package name; purely informational, not used by codegen.
    #[serde(default = "default_name")]
    pub name: String,
    /// Entry unit path, relative to the manifest's directory.
    #[serde(default = "default_entry")]
    pub entry: String,
    /// Default compile target (spec §4.7's `options.target`), overridable
    /// by `--target`.
    #[serde(default)]
    pub target: Option<String>,
    /// Default optimization level `0..=3`, overridable by `-O`.
    #[serde(default)]
    pub optimization: Option<u8>,
    /// `true` builds in library mode (spec §4.5.7), overridable by `--lib`.
    #[serde(default)]
    pub library: bool,
}

fn default_name() -> String {
    "trace-project".to_string()
}

fn default_entry() -> String {
    "main.trace".to_string()
}

impl Default for Package {
    fn default() -> Self {
        Package { name: default_name(), entry: default_entry(), target: None, optimization: None, library: false }
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest { package: Package::default() }
    }
}

/// Reads and parses `trace.toml` from `dir`, if present. Returns
/// `Ok(None)` rather than an error when the file is simply absent — a
/// manifest is optional (spec §4.9), unlike a missing source file.
pub fn load(dir: &Path) -> Result<Option<Manifest>, String> {
    let path = dir.join("trace.toml");
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|e| format!("reading {}: {e}", path.display()))?;
    toml::from_str(&text).map_err(|e| format!("parsing {}: {e}", path.display()))
}

/// Resolves the entry path a manifest names, relative to its directory.
pub fn entry_path(dir: &Path, manifest: &Manifest) -> PathBuf {
    dir.join(&manifest.package.entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_manifest_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn parses_package_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("trace.toml")).unwrap();
        writeln!(f, "[package]\nname = \"demo\"\nentry = \"src/app.trace\"\ntarget = \"wasm32\"\noptimization = 2\n").unwrap();
        let manifest = load(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.package.name, "demo");
        assert_eq!(manifest.package.entry, "src/app.trace");
        assert_eq!(manifest.package.target.as_deref(), Some("wasm32"));
        assert_eq!(manifest.package.optimization, Some(2));
    }

    #[test]
    fn defaults_apply_when_fields_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("trace.toml")).unwrap();
        writeln!(f, "[package]\nname = \"bare\"\n").unwrap();
        let manifest = load(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.package.entry, "main.trace");
        assert!(manifest.package.target.is_none());
        assert!(!manifest.package.library);
    }
}
