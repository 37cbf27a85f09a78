use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};
use crate::error::{Result, SwitchError};
use crate::global::config::Settings;

/// Installs a single dependency specifier.
///
/// Implementations are expected to update the project manifest as a side
/// effect, the way `npm install <spec>` does. The engine reloads the manifest
/// after every successful call.
#[async_trait]
pub trait Installer: Send + Sync {
    /// Installs `target` and waits for completion.
    ///
    /// # Errors
    /// [`SwitchError::InstallFailed`] carrying the installer's own error output.
    async fn install(&self, target: &str) -> Result<()>;
}

/// Runs an external package-manager command, `npm install <target>` by default.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    program: String,
    args: Vec<String>,
    workdir: PathBuf,
}

impl CommandInstaller {
    /// Creates an installer running `program args... <target>` inside `workdir`.
    pub fn new<P: AsRef<Path>>(program: &str, args: &[String], workdir: P) -> CommandInstaller {
        CommandInstaller {
            program: program.to_string(),
            args: args.to_vec(),
            workdir: workdir.as_ref().to_path_buf(),
        }
    }

    pub fn from_settings<P: AsRef<Path>>(settings: &Settings, workdir: P) -> CommandInstaller {
        CommandInstaller::new(&settings.installer, &settings.install_args, workdir)
    }

    /// The command line that would install `target`, for display.
    pub fn command_line(&self, target: &str) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(self.args.iter().map(String::as_str));
        parts.push(target);
        parts.join(" ")
    }
}

#[async_trait]
impl Installer for CommandInstaller {
    async fn install(&self, target: &str) -> Result<()> {
        info!(command = %self.command_line(target), "running installer");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(target)
            .current_dir(&self.workdir)
            .output()
            .await
            .map_err(|e| SwitchError::InstallFailed {
                target: target.to_string(),
                cause: format!("could not run `{}`: {}", self.program, e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            debug!(target: "libswitch::installer", "{line}");
        }

        if !output.status.success() {
            let cause = match stderr.trim() {
                "" => format!("`{}` exited with {}", self.program, output.status),
                message => message.to_string(),
            };
            return Err(SwitchError::InstallFailed {
                target: target.to_string(),
                cause,
            });
        }
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            debug!(target: "libswitch::installer", "{line}");
        }
        Ok(())
    }
}
