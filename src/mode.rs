use std::fmt;
use std::str::FromStr;
use crate::manifest::ManifestSnapshot;
use crate::registry::LibraryEntry;
use crate::util::LOCAL_PREFIX;

/// How a dependency is currently resolved.
///
/// Never stored: always recomputed from a [`ManifestSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Installed from a path on this machine (`file:` specifier).
    Local,
    /// Installed from the package registry.
    Remote,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Local => "local",
            Mode::Remote => "remote",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Mode::Local),
            "remote" => Ok(Mode::Remote),
            other => Err(format!("unknown mode `{other}`, expected `local` or `remote`")),
        }
    }
}

/// Returns `true` if `key` is declared with a `file:` specifier.
///
/// Undeclared dependencies are remote.
pub fn is_local(snapshot: &ManifestSnapshot, key: &str) -> bool {
    snapshot
        .dependency(key)
        .is_some_and(|spec| spec.starts_with(LOCAL_PREFIX))
}

/// Resolves the mode of a registered library.
///
/// The library's own name is looked up first. When the manifest doesn't
/// declare it, the package name of the remote target is tried, so a library
/// registered as `A` with remote `pkg-a` follows the `pkg-a` declaration.
pub fn resolve(snapshot: &ManifestSnapshot, entry: &LibraryEntry) -> Mode {
    let key = if snapshot.dependency(&entry.name).is_some() {
        Some(entry.name.as_str())
    } else {
        entry.package_name()
    };
    match key {
        Some(key) if is_local(snapshot, key) => Mode::Local,
        _ => Mode::Remote,
    }
}
