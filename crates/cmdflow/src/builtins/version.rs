use crate::console::Settings;
use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Walk up from `start` and return the first file named one of `names`.
///
/// Within one directory, earlier names win.
pub fn find_manifest(start: &Path, names: &[String]) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in names {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => return None,
        }
    }
}

/// The version string declared by a manifest, if it declares one directly.
///
/// TOML manifests use `package.version`; anything else is read as JSON with a
/// top-level `version`. A workspace-inherited version (`version.workspace =
/// true`) is not a string and yields `None`.
pub fn read_manifest_version(path: &Path) -> Result<Option<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;

    let version = if path.extension().is_some_and(|ext| ext == "toml") {
        let doc: toml::Table = contents
            .parse()
            .with_context(|| format!("failed to parse manifest TOML: {}", path.display()))?;
        doc.get("package")
            .and_then(|p| p.get("version"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    } else {
        let doc: serde_json::Value = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse manifest JSON: {}", path.display()))?;
        doc.get("version")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    Ok(version)
}

/// Resolve the project version for the `version` builtin.
///
/// Starts at `settings.search_root` (or the current directory) and keeps
/// walking up past manifests that do not declare a version of their own.
pub fn project_version(settings: &Settings) -> Option<String> {
    let mut dir = match &settings.search_root {
        Some(root) => root.clone(),
        None => std::env::current_dir().ok()?,
    };

    loop {
        let path = find_manifest(&dir, &settings.manifest_names)?;
        match read_manifest_version(&path) {
            Ok(Some(version)) => {
                if let Err(err) = semver::Version::parse(&version) {
                    tracing::warn!(manifest = %path.display(), %version, error = %err, "manifest version is not valid semver");
                }
                return Some(version);
            }
            Ok(None) => {
                tracing::debug!(manifest = %path.display(), "manifest has no version, looking further up");
            }
            Err(err) => {
                tracing::warn!(manifest = %path.display(), error = %err, "skipping unreadable manifest");
            }
        }
        dir = path.parent()?.parent()?.to_path_buf();
    }
}
