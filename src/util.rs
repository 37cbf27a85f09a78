use std::path::{Path, PathBuf};

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Specifier prefix marking a dependency installed from a local path.
pub const LOCAL_PREFIX: &str = "file:";

/// Walks from `start` up through its ancestors and returns the first
/// `package.json` found.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
}

/// Strips the `file:` prefix from a local specifier, if present.
pub fn strip_local_prefix(target: &str) -> &str {
    target.strip_prefix(LOCAL_PREFIX).unwrap_or(target)
}

/// Joins a base directory and a project-relative path with exactly one `/`.
///
/// A leading `./` on `relative` is dropped. An empty base yields `relative`
/// unchanged.
pub fn join_alias_path(base: &str, relative: &str) -> String {
    let relative = relative.trim_start_matches("./").trim_start_matches('/');
    if base.is_empty() {
        return relative.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), relative)
}

/// Derives the package name from a registry specifier such as `pkg`,
/// `pkg@1.2.3` or `@scope/pkg@^2.0.0`.
///
/// Returns `None` for specifiers that don't name a registry package
/// (URLs, paths, protocol specifiers).
pub fn package_name(spec: &str) -> Option<&str> {
    let (scoped, rest) = match spec.strip_prefix('@') {
        Some(rest) => (true, rest),
        None => (false, spec),
    };
    let name_len = rest.find('@').unwrap_or(rest.len());
    let name = &rest[..name_len];
    if name.is_empty() || name.contains(':') || name.starts_with('.') {
        return None;
    }
    let slashes = name.matches('/').count();
    if (scoped && slashes != 1) || (!scoped && slashes != 0) {
        return None;
    }
    let end = name_len + usize::from(scoped);
    Some(&spec[..end])
}
