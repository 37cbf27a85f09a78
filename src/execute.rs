use anyhow::{bail, Result};
use colored::Colorize;
use libswitch::{AliasSync, BatchResult, Libswitch, Mode, Settings, SwitchOutcome};
use crate::cli::{LibswitchCommand, CLI};

pub async fn execute(cli: CLI) -> Result<()> {
    let settings = settings_for(&cli)?;
    let cwd = std::env::current_dir()?;
    let mut engine = Libswitch::discover(&cwd, &settings)?;

    match cli.command {
        LibswitchCommand::Status { names } => {
            execute_status(&engine, names)
        }
        LibswitchCommand::List => {
            execute_list(&engine)
        }
        LibswitchCommand::Local { names } => {
            execute_switch(&mut engine, names, Mode::Local).await
        }
        LibswitchCommand::Remote { names } => {
            execute_switch(&mut engine, names, Mode::Remote).await
        }
        LibswitchCommand::Update { names } => {
            execute_update(&mut engine, names).await
        }
        LibswitchCommand::Sync => {
            execute_sync(&engine)
        }
        LibswitchCommand::Tsconfig => {
            execute_tsconfig(&engine)
        }
    }
}

fn settings_for(cli: &CLI) -> Result<Settings> {
    let mut settings = Settings::resolve()?;
    if let Some(installer) = &cli.installer {
        settings.installer = installer.clone();
    }
    if let Some(alias_file) = &cli.alias_file {
        settings.alias_file = alias_file.clone();
    }
    Ok(settings)
}

fn all_or(engine: &Libswitch, names: Vec<String>) -> Vec<String> {
    if names.is_empty() {
        engine.list_libraries().into_iter().map(String::from).collect()
    } else {
        names
    }
}

fn describe(mode: Mode) -> String {
    match mode {
        Mode::Local => "dev (local)".green().to_string(),
        Mode::Remote => "prod (remote)".blue().to_string(),
    }
}

pub fn execute_status(engine: &Libswitch, names: Vec<String>) -> Result<()> {
    let names = all_or(engine, names);
    if names.is_empty() {
        println!("No libraries configured");
        return Ok(());
    }
    for name in names {
        println!("{:<20} : {}", name, describe(engine.current_mode(&name)));
    }
    Ok(())
}

pub fn execute_list(engine: &Libswitch) -> Result<()> {
    if engine.registry().is_empty() {
        println!("No libraries configured");
        return Ok(());
    }
    for entry in engine.registry().iter() {
        println!("{} ({})", entry.name.bold(), describe(engine.current_mode(&entry.name)));
        println!("  local:  {}", entry.local_target);
        println!("  remote: {}", entry.remote_target);
        if let Some(alias) = &entry.alias_path {
            println!("  alias:  {}", alias);
        }
    }
    Ok(())
}

pub async fn execute_switch(engine: &mut Libswitch, names: Vec<String>, to: Mode) -> Result<()> {
    let results = engine.switch_libraries(&names, to).await;
    report(results, "switch", |name, outcome| format!("{} is now {}.", name, outcome.mode))
}

pub async fn execute_update(engine: &mut Libswitch, names: Vec<String>) -> Result<()> {
    let names = all_or(engine, names);
    if names.is_empty() {
        println!("No libraries configured");
        return Ok(());
    }
    let results = engine.update_libraries(&names).await;
    report(results, "update", |name, outcome| format!("{} updated ({}).", name, outcome.mode))
}

pub fn execute_sync(engine: &Libswitch) -> Result<()> {
    let path = engine.alias_file().display().to_string();
    match engine.sync_aliases()? {
        AliasSync::Missing => println!("{} not found, nothing to sync", path),
        AliasSync::Unchanged => println!("{} already in sync", path),
        AliasSync::Written => println!("🔧 {} paths synchronized.", path),
        AliasSync::Skipped(e) => return Err(e.into()),
    }
    Ok(())
}

pub fn execute_tsconfig(engine: &Libswitch) -> Result<()> {
    let path = engine.alias_file();
    if path.exists() {
        println!("{}", path.display());
    } else {
        println!("{} {}", path.display(), "(not found)".yellow());
    }
    Ok(())
}

fn report<F>(results: Vec<BatchResult>, verb: &str, success: F) -> Result<()>
where
    F: Fn(&str, &SwitchOutcome) -> String,
{
    let total = results.len();
    let mut failed = 0;
    for (name, result) in results {
        match result {
            Ok(outcome) => {
                println!("{} {}", "✅".green(), success(&name, &outcome));
                if let AliasSync::Skipped(e) = &outcome.aliases {
                    eprintln!("{} aliases not updated: {}", "⚠️".yellow(), e);
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{} Failed to {} {}: {}", "❌".red(), verb, name, e);
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} libraries failed", failed, total);
    }
    Ok(())
}
