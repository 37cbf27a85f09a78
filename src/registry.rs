use serde_json::{Map, Value};
use crate::error::{Result, SwitchError};
use crate::manifest::ManifestSnapshot;
use crate::mode::Mode;
use crate::util::{package_name, strip_local_prefix};

/// One managed dependency, as declared in the `libswitch` section of
/// `package.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    /// Name of the library. Also the key looked up in the dependency sections.
    pub name: String,
    /// Installer specifier for the local checkout, e.g. `file:../ui-kit`.
    pub local_target: String,
    /// Installer specifier for the published version, e.g. `ui-kit@^2`.
    pub remote_target: String,
    /// Entry point relative to the local checkout, e.g. `src/index.ts`.
    pub alias_path: Option<String>,
}

impl LibraryEntry {
    pub fn new(name: &str, local_target: &str, remote_target: &str) -> LibraryEntry {
        LibraryEntry {
            name: name.to_string(),
            local_target: local_target.to_string(),
            remote_target: remote_target.to_string(),
            alias_path: None,
        }
    }

    pub fn with_alias(mut self, alias_path: &str) -> LibraryEntry {
        self.alias_path = Some(alias_path.to_string()).filter(|a| !a.is_empty());
        self
    }

    /// The specifier to hand to the installer for `mode`.
    pub fn target(&self, mode: Mode) -> &str {
        match mode {
            Mode::Local => &self.local_target,
            Mode::Remote => &self.remote_target,
        }
    }

    /// The local checkout directory, i.e. the local target without `file:`.
    pub fn local_base(&self) -> &str {
        strip_local_prefix(&self.local_target)
    }

    /// The package name the remote target installs under, if derivable.
    pub fn package_name(&self) -> Option<&str> {
        package_name(&self.remote_target)
    }

    fn validate(&self) -> Result<()> {
        let name = if self.name.is_empty() { "unknown" } else { self.name.as_str() };
        let required = [
            ("name", &self.name),
            ("local", &self.local_target),
            ("remote", &self.remote_target),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(SwitchError::InvalidLibraryConfig {
                    name: name.to_string(),
                    field,
                });
            }
        }
        Ok(())
    }
}

/// The libraries under engine control, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entries: Vec<LibraryEntry>,
}

impl Registry {
    /// Builds the registry from the `libswitch` section of a manifest.
    ///
    /// The section may hold a single record or a list of records. A missing
    /// section yields an empty registry.
    ///
    /// # Errors
    /// [`SwitchError::InvalidLibraryConfig`] for the first malformed record;
    /// nothing is registered in that case.
    pub fn build(snapshot: &ManifestSnapshot) -> Result<Registry> {
        let records: Vec<&Value> = match &snapshot.libswitch {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(list)) => list.iter().collect(),
            Some(record @ Value::Object(_)) => vec![record],
            Some(_) => return Err(malformed_section()),
        };
        let entries = records
            .into_iter()
            .map(|record| match record {
                Value::Object(fields) => Ok(entry_from_fields(fields)),
                _ => Err(malformed_section()),
            })
            .collect::<Result<Vec<_>>>()?;
        Registry::from_entries(entries)
    }

    /// Builds a registry from already-parsed entries, validating each.
    ///
    /// A repeated name replaces the earlier entry but keeps its position.
    pub fn from_entries(entries: Vec<LibraryEntry>) -> Result<Registry> {
        let mut registry = Registry::default();
        for entry in entries {
            entry.validate()?;
            match registry.entries.iter_mut().find(|e| e.name == entry.name) {
                Some(existing) => *existing = entry,
                None => registry.entries.push(entry),
            }
        }
        Ok(registry)
    }

    /// Registered names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Looks up a library by name.
    pub fn get(&self, name: &str) -> Result<&LibraryEntry> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| SwitchError::LibraryNotFound { name: name.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &LibraryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn malformed_section() -> SwitchError {
    SwitchError::InvalidLibraryConfig {
        name: "unknown".to_string(),
        field: "libswitch",
    }
}

fn entry_from_fields(fields: &Map<String, Value>) -> LibraryEntry {
    let field = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    LibraryEntry {
        name: field("name"),
        local_target: field("local"),
        remote_target: field("remote"),
        alias_path: Some(field("alias")).filter(|a| !a.is_empty()),
    }
}
