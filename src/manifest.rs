use std::path::{Path, PathBuf};
use std::str::FromStr;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use crate::error::{Result, SwitchError};
use crate::util::find_manifest;

/// An in-memory parse of a `package.json`.
///
/// Only the sections the engine reads are kept. Everything else in the file
/// is ignored, and the engine never writes the manifest back: the external
/// installer owns it.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSnapshot {
    /// Production dependency declarations (`name -> specifier`).
    #[serde(default)]
    pub dependencies: Option<Map<String, Value>>,
    /// Development dependency declarations.
    #[serde(default)]
    pub dev_dependencies: Option<Map<String, Value>>,
    /// The raw `libswitch` section: a single record or a list of records.
    #[serde(default)]
    pub libswitch: Option<Value>,
}

impl ManifestSnapshot {
    /// Returns the declared specifier for `name`.
    ///
    /// `dependencies` wins over `devDependencies`; an empty or non-string
    /// value counts as undeclared and falls through to the next section.
    pub fn dependency(&self, name: &str) -> Option<&str> {
        [&self.dependencies, &self.dev_dependencies]
            .into_iter()
            .flatten()
            .filter_map(|section| section.get(name).and_then(Value::as_str))
            .find(|spec| !spec.is_empty())
    }
}

impl FromStr for ManifestSnapshot {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

/// Owns the path of the project manifest and its latest snapshot.
#[derive(Debug)]
pub struct Manifest {
    path: PathBuf,
    snapshot: ManifestSnapshot,
}

impl Manifest {
    /// Locates `package.json` in `start` or the closest parent and loads it.
    ///
    /// # Errors
    /// [`SwitchError::ManifestNotFound`] if no manifest exists upward from
    /// `start`, otherwise the errors of [`Manifest::load`].
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Manifest> {
        let path = find_manifest(start.as_ref()).ok_or_else(|| SwitchError::ManifestNotFound {
            start: start.as_ref().to_path_buf(),
        })?;
        Manifest::load(path)
    }

    /// Loads the manifest at `path`.
    ///
    /// # Errors
    /// Returns an error if the file can't be read or is not valid JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Manifest> {
        let path = path.as_ref().to_path_buf();
        let snapshot = read_snapshot(&path)?;
        Ok(Manifest { path, snapshot })
    }

    /// Re-reads the manifest from disk, replacing the current snapshot.
    ///
    /// Called after every install, since the installer rewrites the file.
    pub fn reload(&mut self) -> Result<&ManifestSnapshot> {
        self.snapshot = read_snapshot(&self.path)?;
        debug!(path = %self.path.display(), "manifest reloaded");
        Ok(&self.snapshot)
    }

    pub fn snapshot(&self) -> &ManifestSnapshot {
        &self.snapshot
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The project root, i.e. the directory holding the manifest.
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

fn read_snapshot(path: &Path) -> Result<ManifestSnapshot> {
    let content = std::fs::read_to_string(path).map_err(|source| SwitchError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    content.parse::<ManifestSnapshot>().map_err(|source| SwitchError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}
