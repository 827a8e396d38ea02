//! Provider manifests
//!
//! Each installed provider package drops a TOML manifest into the plugin
//! directory mapping `(group, name)` to the provider symbol it links in:
//!
//! ```toml
//! [package]
//! name = "podext-youtube"
//! version = "0.3.1"
//!
//! [providers.extractors]
//! youtube = "podext_youtube::YoutubeExtractor"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One `(group, name) → symbol` declaration and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDeclaration {
    pub group: String,
    pub name: String,
    pub symbol: String,
    pub source: String,
}

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Cannot read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid manifest {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    package: PackageSection,
    #[serde(default)]
    providers: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct PackageSection {
    name: String,
    version: Option<String>,
}

/// Parsed manifest of one installed package
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    pub package: String,
    pub version: Option<String>,
    pub path: PathBuf,
    /// group → (name → symbol)
    pub providers: BTreeMap<String, BTreeMap<String, String>>,
}

impl PackageManifest {
    /// Parse manifest text; `path` is only used for error messages and source
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let file: ManifestFile = toml::from_str(content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if file.package.name.trim().is_empty() {
            return Err(ManifestError::Invalid {
                path: path.to_path_buf(),
                message: "package name must not be empty".to_string(),
            });
        }
        for (group, entries) in &file.providers {
            if let Some((name, _)) = entries.iter().find(|(_, symbol)| symbol.trim().is_empty()) {
                return Err(ManifestError::Invalid {
                    path: path.to_path_buf(),
                    message: format!("provider '{}' in group '{}' has an empty symbol", name, group),
                });
            }
        }

        Ok(Self {
            package: file.package.name,
            version: file.package.version,
            path: path.to_path_buf(),
            providers: file.providers,
        })
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Source label used for registry entries: `name@version` or `name`
    pub fn source(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.package, version),
            None => self.package.clone(),
        }
    }

    /// Declarations this package contributes to `group`, in name order
    pub fn declarations(&self, group: &str) -> Vec<ProviderDeclaration> {
        let source = self.source();
        self.providers
            .get(group)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(name, symbol)| ProviderDeclaration {
                        group: group.to_string(),
                        name: name.clone(),
                        symbol: symbol.trim().to_string(),
                        source: source.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Load every `*.toml` manifest in `dir`, sorted by path.
///
/// Unreadable or invalid manifests are logged and skipped.
pub fn load_manifests(dir: &Path) -> Vec<PackageManifest> {
    if !dir.is_dir() {
        log::debug!("Plugin manifest directory {} does not exist", dir.display());
        return Vec::new();
    }

    let pattern = dir.join("*.toml");
    let paths = match glob::glob(&pattern.to_string_lossy()) {
        Ok(paths) => paths,
        Err(e) => {
            log::warn!("Invalid manifest search pattern {}: {}", pattern.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    files.sort();

    files
        .iter()
        .filter_map(|path| match PackageManifest::load(path) {
            Ok(manifest) => {
                log::debug!(
                    "Loaded manifest for package '{}' from {}",
                    manifest.package,
                    path.display()
                );
                Some(manifest)
            }
            Err(e) => {
                log::warn!("Skipping plugin manifest: {}", e);
                None
            }
        })
        .collect()
}
