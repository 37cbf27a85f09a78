use std::path::{Path, PathBuf};
use tracing::{info, warn};
use crate::alias::{self, AliasSync};
use crate::error::Result;
use crate::global::config::Settings;
use crate::installer::{CommandInstaller, Installer};
use crate::manifest::{Manifest, ManifestSnapshot};
use crate::mode::{self, Mode};
use crate::registry::{LibraryEntry, Registry};

/// Result of a successful switch or update.
#[derive(Debug)]
pub struct SwitchOutcome {
    pub name: String,
    /// The mode that was asked for.
    pub requested: Mode,
    /// The mode the reloaded manifest reports.
    pub mode: Mode,
    /// The specifier handed to the installer.
    pub target: String,
    pub aliases: AliasSync,
}

/// One item of a batch command.
pub type BatchResult = (String, Result<SwitchOutcome>);

/// The switching engine for one project.
///
/// The registry is fixed at construction. Modes are always read from the
/// current manifest snapshot, which is reloaded after every install.
pub struct Libswitch<I = CommandInstaller> {
    manifest: Manifest,
    registry: Registry,
    installer: I,
    alias_file: PathBuf,
}

impl Libswitch<CommandInstaller> {
    /// Opens the project whose `package.json` is in `start` or above, using
    /// the installer and alias file from `settings`.
    pub fn discover<P: AsRef<Path>>(start: P, settings: &Settings) -> Result<Self> {
        let manifest = Manifest::discover(start)?;
        let installer = CommandInstaller::from_settings(settings, manifest.root());
        let alias_file = manifest.root().join(&settings.alias_file);
        Libswitch::new(manifest, installer, alias_file)
    }
}

impl<I: Installer> Libswitch<I> {
    /// # Errors
    /// `SwitchError::InvalidLibraryConfig` if any registered library is
    /// malformed; the engine refuses to run on a partial configuration.
    pub fn new(manifest: Manifest, installer: I, alias_file: PathBuf) -> Result<Self> {
        let registry = Registry::build(manifest.snapshot())?;
        info!(
            manifest = %manifest.path().display(),
            libraries = registry.len(),
            "loaded libswitch config"
        );
        Ok(Libswitch {
            manifest,
            registry,
            installer,
            alias_file,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn snapshot(&self) -> &ManifestSnapshot {
        self.manifest.snapshot()
    }

    pub fn alias_file(&self) -> &Path {
        &self.alias_file
    }

    pub fn installer(&self) -> &I {
        &self.installer
    }

    /// Registered library names in declaration order.
    pub fn list_libraries(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Current mode of `name`.
    ///
    /// Registered libraries resolve through their entry; any other name is
    /// looked up directly in the dependency sections.
    pub fn current_mode(&self, name: &str) -> Mode {
        let snapshot = self.manifest.snapshot();
        match self.registry.get(name) {
            Ok(entry) => mode::resolve(snapshot, entry),
            Err(_) if mode::is_local(snapshot, name) => Mode::Local,
            Err(_) => Mode::Remote,
        }
    }

    /// Installs the `to` target of `name`, reloads the manifest and resyncs
    /// the aliases of every registered library.
    ///
    /// Runs the full cycle even if the library is already in mode `to`.
    ///
    /// # Errors
    /// `SwitchError::LibraryNotFound` before anything is run,
    /// `SwitchError::InstallFailed` with the alias file untouched, or a
    /// manifest error from the reload.
    pub async fn switch_library(&mut self, name: &str, to: Mode) -> Result<SwitchOutcome> {
        let entry = self.registry.get(name)?.clone();
        info!(library = name, mode = %to, target = %entry.target(to), "switching");
        self.install_and_sync(&entry, to).await
    }

    /// Reinstalls `name` in its current mode, then reloads and resyncs like
    /// [`Libswitch::switch_library`].
    pub async fn update_library(&mut self, name: &str) -> Result<SwitchOutcome> {
        let entry = self.registry.get(name)?.clone();
        let current = mode::resolve(self.manifest.snapshot(), &entry);
        info!(library = name, mode = %current, target = %entry.target(current), "updating");
        self.install_and_sync(&entry, current).await
    }

    /// Switches each library in turn. A failure is recorded for its item and
    /// the remaining libraries are still processed.
    pub async fn switch_libraries(&mut self, names: &[String], to: Mode) -> Vec<BatchResult> {
        let mut results = Vec::with_capacity(names.len());
        for name in names {
            let result = self.switch_library(name, to).await;
            if let Err(e) = &result {
                warn!(library = %name, "switch failed: {e}");
            }
            results.push((name.clone(), result));
        }
        results
    }

    /// Updates each library in turn, like [`Libswitch::switch_libraries`].
    pub async fn update_libraries(&mut self, names: &[String]) -> Vec<BatchResult> {
        let mut results = Vec::with_capacity(names.len());
        for name in names {
            let result = self.update_library(name).await;
            if let Err(e) = &result {
                warn!(library = %name, "update failed: {e}");
            }
            results.push((name.clone(), result));
        }
        results
    }

    /// Rewrites the alias file from the current snapshot without installing
    /// anything.
    pub fn sync_aliases(&self) -> Result<AliasSync> {
        alias::sync(&self.alias_file, self.manifest.snapshot(), &self.registry)
    }

    async fn install_and_sync(&mut self, entry: &LibraryEntry, mode: Mode) -> Result<SwitchOutcome> {
        let target = entry.target(mode).to_string();
        self.installer.install(&target).await?;

        let snapshot = self.manifest.reload()?;
        let observed = mode::resolve(snapshot, entry);
        if observed != mode {
            warn!(
                library = %entry.name,
                requested = %mode,
                observed = %observed,
                "manifest does not reflect the requested mode after install"
            );
        }

        let aliases = self.sync_aliases().unwrap_or_else(|e| {
            warn!("alias sync skipped: {e}");
            AliasSync::Skipped(e)
        });
        Ok(SwitchOutcome {
            name: entry.name.clone(),
            requested: mode,
            mode: observed,
            target,
            aliases,
        })
    }
}
