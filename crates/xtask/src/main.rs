use std::fs;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Sanctum maintainer tasks")]
struct Cli {
    #[command(subcommand)]
    command: Option<CommandName>,
}

#[derive(Debug, Default, Subcommand)]
enum CommandName {
    /// Regenerate sanctum-core/default_config.toml via `sanctum config generate`.
    #[default]
    UpdateDefaultConfig,
    /// Fail if default_config.toml differs from the generated config.
    CheckDefaultConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or_default() {
        CommandName::UpdateDefaultConfig => update_default_config(),
        CommandName::CheckDefaultConfig => check_default_config(),
    }
}

fn update_default_config() -> Result<()> {
    let dest = default_config_path()?;
    let generated = generate_config()?;

    fs::write(&dest, generated).with_context(|| format!("write config to {}", dest.display()))?;

    println!("Updated {}", dest.display());
    Ok(())
}

fn check_default_config() -> Result<()> {
    let dest = default_config_path()?;
    let generated = generate_config()?;
    let current =
        fs::read_to_string(&dest).with_context(|| format!("read {}", dest.display()))?;

    if current != generated {
        bail!(
            "{} is stale; run `cargo run -p xtask -- update-default-config`",
            dest.display()
        );
    }
    println!("{} is up to date", dest.display());
    Ok(())
}

fn generate_config() -> Result<String> {
    let root = project_root()?;
    let output = Command::new("cargo")
        .current_dir(&root)
        .args(["run", "-q", "-p", "sanctum", "--", "config", "generate"])
        .output()
        .context("run `cargo run -p sanctum -- config generate`")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("config generate failed: {stderr}");
    }

    String::from_utf8(output.stdout).context("generated config is not UTF-8")
}

fn default_config_path() -> Result<PathBuf> {
    Ok(project_root()?
        .join("crates")
        .join("sanctum-core")
        .join("default_config.toml"))
}

fn project_root() -> Result<PathBuf> {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let root = manifest_dir
        .parent()
        .and_then(|crates| crates.parent())
        .context("locate workspace root from CARGO_MANIFEST_DIR")?;
    Ok(root.to_path_buf())
}
