//! Keeps `compilerOptions.paths` in the alias configuration file
//! (`tsconfig.json` by default) consistent with the live dependency state.
//!
//! For every registered library with an alias path the file holds exactly
//! two engine-owned keys while the library is local, `name` and `name/*`,
//! and neither while it is remote. All other content is left alone.

use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;
use regex::Regex;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use crate::error::{Result, SwitchError};
use crate::manifest::ManifestSnapshot;
use crate::mode::{self, Mode};
use crate::registry::{LibraryEntry, Registry};
use crate::util::join_alias_path;

/// File name of the alias configuration when none is configured.
pub const DEFAULT_ALIAS_FILE: &str = "tsconfig.json";

static ENTRY_POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|/)(index|main)\.(ts|js)$").expect("entry point pattern is valid")
});

/// What a synchronization pass did to the alias file.
#[derive(Debug)]
pub enum AliasSync {
    /// No alias file exists; the project doesn't use path aliases.
    Missing,
    /// The file already matched the dependency state and was not rewritten.
    Unchanged,
    /// The file was rewritten.
    Written,
    /// Synchronization failed; the switch that triggered it still stands.
    Skipped(SwitchError),
}

impl AliasSync {
    pub fn is_written(&self) -> bool {
        matches!(self, AliasSync::Written)
    }
}

/// The two path mappings a local library contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMapping {
    pub exact_key: String,
    pub exact_path: String,
    pub wildcard_key: String,
    pub wildcard_path: String,
}

impl AliasMapping {
    /// Computes the mappings for `entry`, or `None` if it has no alias path.
    pub fn for_entry(entry: &LibraryEntry) -> Option<AliasMapping> {
        let alias_path = entry.alias_path.as_deref()?;
        let exact_path = join_alias_path(entry.local_base(), alias_path);
        let wildcard_path = wildcard_path(&exact_path);
        Some(AliasMapping {
            exact_key: entry.name.clone(),
            exact_path,
            wildcard_key: wildcard_key(&entry.name),
            wildcard_path,
        })
    }
}

fn wildcard_key(name: &str) -> String {
    format!("{name}/*")
}

/// Turns an entry-point path into the matching wildcard path.
///
/// A trailing `index` or `main` file name with a `.ts` or `.js` extension is
/// replaced by `*`. Any other path is returned unchanged.
pub fn wildcard_path(path: &str) -> String {
    ENTRY_POINT.replace(path, "${1}*").into_owned()
}

/// Rewrites the alias file at `path` to match `snapshot` for every library in
/// `registry`.
///
/// # Errors
/// [`SwitchError::AliasConfigParse`] if the file can't be read or interpreted
/// (nothing is written in that case), [`SwitchError::AliasConfigWrite`] if
/// the updated file can't be persisted.
pub fn sync(path: &Path, snapshot: &ManifestSnapshot, registry: &Registry) -> Result<AliasSync> {
    if !path.exists() {
        debug!(path = %path.display(), "no alias file, skipping sync");
        return Ok(AliasSync::Missing);
    }
    let parse_error = |cause: String| SwitchError::AliasConfigParse {
        path: path.to_path_buf(),
        cause,
    };
    let content = std::fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
    let original: Value = serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;

    let mut updated = original.clone();
    apply(&mut updated, snapshot, registry).map_err(parse_error)?;
    if updated == original {
        debug!(path = %path.display(), "alias file already in sync");
        return Ok(AliasSync::Unchanged);
    }

    write_atomic(path, &updated)?;
    info!(path = %path.display(), "alias paths synchronized");
    Ok(AliasSync::Written)
}

/// Applies the alias mappings to a parsed alias document in place.
///
/// Returns a description of the problem if the document doesn't have the
/// expected shape; the document is left unmodified in that case.
pub fn apply(
    config: &mut Value,
    snapshot: &ManifestSnapshot,
    registry: &Registry,
) -> std::result::Result<(), String> {
    let root = config
        .as_object_mut()
        .ok_or_else(|| "top level is not an object".to_string())?;
    let had_options = root.get("compilerOptions").is_some_and(Value::is_object);
    let mut options = match root.get("compilerOptions") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(options)) => options.clone(),
        Some(_) => return Err("`compilerOptions` is not an object".to_string()),
    };
    let mut paths = match options.get("paths") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(paths)) => paths.clone(),
        Some(_) => return Err("`compilerOptions.paths` is not an object".to_string()),
    };

    for entry in registry.iter() {
        let Some(mapping) = AliasMapping::for_entry(entry) else {
            continue;
        };
        match mode::resolve(snapshot, entry) {
            Mode::Local => {
                paths.insert(mapping.exact_key, Value::from(vec![mapping.exact_path]));
                paths.insert(mapping.wildcard_key, Value::from(vec![mapping.wildcard_path]));
            }
            Mode::Remote => {
                paths.shift_remove(&mapping.exact_key);
                paths.shift_remove(&mapping.wildcard_key);
            }
        }
    }

    if paths.is_empty() {
        options.shift_remove("paths");
    } else {
        options.insert("paths".to_string(), Value::Object(paths));
    }
    if options.is_empty() && !had_options {
        return Ok(());
    }
    root.insert("compilerOptions".to_string(), Value::Object(options));
    Ok(())
}

fn write_atomic(path: &Path, config: &Value) -> Result<()> {
    let write_error = |source: std::io::Error| SwitchError::AliasConfigWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut content = serde_json::to_string_pretty(config)
        .map_err(|e| write_error(std::io::Error::other(e)))?;
    content.push('\n');

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    // Temp files are created 0600; carry over the original mode.
    if let Ok(metadata) = std::fs::metadata(path) {
        std::fs::set_permissions(file.path(), metadata.permissions()).map_err(write_error)?;
    }
    file.write_all(content.as_bytes()).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn registry_a() -> Registry {
        Registry::from_entries(vec![
            LibraryEntry::new("A", "file:../A", "pkg-a").with_alias("src/index.ts"),
        ])
        .unwrap()
    }

    fn snapshot(json: &str) -> ManifestSnapshot {
        json.parse().unwrap()
    }

    #[test]
    fn test_wildcard_path() {
        assert_eq!(wildcard_path("../A/src/index.ts"), "../A/src/*");
        assert_eq!(wildcard_path("../A/lib/main.js"), "../A/lib/*");
        assert_eq!(wildcard_path("index.ts"), "*");
        // Anything that isn't an index/main entry point is kept as is.
        assert_eq!(wildcard_path("../A/src/public-api.ts"), "../A/src/public-api.ts");
        assert_eq!(wildcard_path("../A/src"), "../A/src");
        assert_eq!(wildcard_path("../A/src/reindex.ts"), "../A/src/reindex.ts");
        assert_eq!(wildcard_path("../A/src/index.tsx"), "../A/src/index.tsx");
    }

    #[test]
    fn test_apply_keeps_non_entry_point_path_for_wildcard() {
        let registry = Registry::from_entries(vec![
            LibraryEntry::new("A", "file:../A", "pkg-a").with_alias("src/public-api.ts"),
        ])
        .unwrap();
        let mut config = json!({});
        apply(&mut config, &snapshot(r#"{"dependencies": {"pkg-a": "file:../A"}}"#), &registry).unwrap();
        assert_eq!(
            config["compilerOptions"]["paths"],
            json!({"A": ["../A/src/public-api.ts"], "A/*": ["../A/src/public-api.ts"]})
        );
    }

    #[test]
    fn test_apply_treats_null_as_absent() {
        let local = snapshot(r#"{"dependencies": {"pkg-a": "file:../A"}}"#);
        let mut config = json!({"compilerOptions": null});
        apply(&mut config, &local, &registry_a()).unwrap();
        assert_eq!(
            config,
            json!({"compilerOptions": {"paths": {"A": ["../A/src/index.ts"], "A/*": ["../A/src/*"]}}})
        );

        let mut config = json!({"compilerOptions": {"strict": true, "paths": null}});
        apply(&mut config, &local, &registry_a()).unwrap();
        assert_eq!(config["compilerOptions"]["strict"], json!(true));
        assert_eq!(config["compilerOptions"]["paths"]["A"], json!(["../A/src/index.ts"]));

        let mut config = json!({"compilerOptions": {"strict": true, "paths": null}});
        apply(&mut config, &snapshot("{}"), &registry_a()).unwrap();
        assert_eq!(config, json!({"compilerOptions": {"strict": true}}));
    }

    #[test]
    fn test_mapping_for_entry() {
        let entry = LibraryEntry::new("A", "file:../A", "pkg-a").with_alias("src/index.ts");
        let mapping = AliasMapping::for_entry(&entry).unwrap();
        assert_eq!(mapping.exact_key, "A");
        assert_eq!(mapping.exact_path, "../A/src/index.ts");
        assert_eq!(mapping.wildcard_key, "A/*");
        assert_eq!(mapping.wildcard_path, "../A/src/*");

        let entry = LibraryEntry::new("B", "file:../B", "pkg-b");
        assert_eq!(AliasMapping::for_entry(&entry), None);
    }

    #[test]
    fn test_apply_local_adds_both_keys() {
        let mut config = json!({"compilerOptions": {"strict": true}});
        apply(&mut config, &snapshot(r#"{"dependencies": {"pkg-a": "file:../A"}}"#), &registry_a()).unwrap();
        assert_eq!(
            config,
            json!({"compilerOptions": {
                "strict": true,
                "paths": {"A": ["../A/src/index.ts"], "A/*": ["../A/src/*"]}
            }})
        );
    }

    #[test]
    fn test_apply_remote_removes_only_engine_keys() {
        let mut config = json!({"compilerOptions": {"paths": {
            "A": ["../A/src/index.ts"],
            "A/*": ["../A/src/*"],
            "@app/*": ["src/*"]
        }}});
        apply(&mut config, &snapshot(r#"{"dependencies": {"pkg-a": "1.2.3"}}"#), &registry_a()).unwrap();
        assert_eq!(config, json!({"compilerOptions": {"paths": {"@app/*": ["src/*"]}}}));
    }

    #[test]
    fn test_apply_drops_empty_paths_table() {
        let mut config = json!({"compilerOptions": {"strict": true, "paths": {"A": ["x"], "A/*": ["x/*"]}}});
        apply(&mut config, &snapshot(r#"{}"#), &registry_a()).unwrap();
        assert_eq!(config, json!({"compilerOptions": {"strict": true}}));
    }

    #[test]
    fn test_apply_does_not_materialize_compiler_options() {
        let mut config = json!({"extends": "./base.json"});
        apply(&mut config, &snapshot(r#"{}"#), &registry_a()).unwrap();
        assert_eq!(config, json!({"extends": "./base.json"}));
    }

    #[test]
    fn test_apply_rejects_unexpected_shape() {
        let mut config = json!({"compilerOptions": {"paths": []}});
        let before = config.clone();
        assert!(apply(&mut config, &snapshot("{}"), &registry_a()).is_err());
        assert_eq!(config, before);
        assert!(apply(&mut json!([]), &snapshot("{}"), &registry_a()).is_err());
    }

    #[test]
    fn test_apply_last_library_wins_on_collision() {
        // `ui`'s wildcard key is `ui/*`, which is also the exact key of the
        // second library.
        let registry = Registry::from_entries(vec![
            LibraryEntry::new("ui", "file:../ui", "ui").with_alias("src/index.ts"),
            LibraryEntry::new("ui/*", "file:../ui-star", "ui-star").with_alias("lib/main.js"),
        ])
        .unwrap();
        let snap = snapshot(r#"{"dependencies": {"ui": "file:../ui", "ui/*": "file:../ui-star"}}"#);
        let mut config = json!({});
        apply(&mut config, &snap, &registry).unwrap();
        let paths = &config["compilerOptions"]["paths"];
        assert_eq!(paths["ui"], json!(["../ui/src/index.ts"]));
        assert_eq!(paths["ui/*"], json!(["../ui-star/lib/main.js"]));
        assert_eq!(paths["ui/*/*"], json!(["../ui-star/lib/*"]));
    }

    #[test]
    fn test_sync_missing_file_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_ALIAS_FILE);
        let result = sync(&path, &snapshot(r#"{"dependencies": {"pkg-a": "file:../A"}}"#), &registry_a()).unwrap();
        assert!(matches!(result, AliasSync::Missing));
        assert!(!path.exists());
    }

    #[test]
    fn test_sync_leaves_unparseable_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_ALIAS_FILE);
        let content = "{\n  // comments are not JSON\n  \"compilerOptions\": {}\n}\n";
        std::fs::write(&path, content).unwrap();

        let err = sync(&path, &snapshot(r#"{"dependencies": {"pkg-a": "file:../A"}}"#), &registry_a()).unwrap_err();
        assert!(matches!(err, SwitchError::AliasConfigParse { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_sync_writes_scenario_and_is_stable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_ALIAS_FILE);
        std::fs::write(&path, r#"{"compilerOptions": {"baseUrl": ".", "paths": {"@app/*": ["src/*"]}}}"#).unwrap();
        let snap = snapshot(r#"{"dependencies": {"pkg-a": "file:../A"}}"#);

        let first = sync(&path, &snap, &registry_a()).unwrap();
        assert!(first.is_written());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"compilerOptions\": {\n    \"baseUrl\": \".\",\n    \"paths\": {\n      \"@app/*\": [\n        \"src/*\"\n      ],\n      \"A\": [\n        \"../A/src/index.ts\"\n      ],\n      \"A/*\": [\n        \"../A/src/*\"\n      ]\n    }\n  }\n}\n"
        );

        let second = sync(&path, &snap, &registry_a()).unwrap();
        assert!(matches!(second, AliasSync::Unchanged));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
    }

    #[test]
    fn test_sync_remote_cleans_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_ALIAS_FILE);
        std::fs::write(&path, r#"{"compilerOptions": {"paths": {"A": ["../A/src/index.ts"], "A/*": ["../A/src/*"]}}}"#).unwrap();

        let result = sync(&path, &snapshot(r#"{"dependencies": {"pkg-a": "1.2.3"}}"#), &registry_a()).unwrap();
        assert!(result.is_written());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\n  \"compilerOptions\": {}\n}\n");
    }
}
