// Top-level handler for an install run.
// Turns parsed CLI arguments into an `InstallRequest`, runs the pipeline and
// is the only place where an outcome becomes a message and an exit code.

use crate::cli::cmd_enums::Cli;
use crate::libs::errors::InstallError;
use crate::libs::tool_installer::{InstallOutcome, InstallRequest, Installer};
use crate::libs::utilities::http::UreqFetcher;
use crate::libs::utilities::path_helpers::{compat_tools_dir, default_steam_root, expand_tilde};
use crate::libs::utilities::progress::DEFAULT_TICK;
use crate::schemas::release::VersionToken;
use crate::{log_debug, log_error, log_info};
use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Runs the installer and maps the result to the process exit code.
pub fn run(cli: &Cli) -> ExitCode {
    match install(cli) {
        Ok(InstallOutcome::Installed { tag, path }) => {
            log_info!("{} installed to {}", tag.bold(), path.display().to_string().green());
            log_info!("Done!");
            ExitCode::SUCCESS
        }
        Ok(InstallOutcome::AlreadyInstalled { tag, path }) => {
            log_info!("{}", already_installed_message(&tag, &path));
            ExitCode::SUCCESS
        }
        Err(err) => {
            log_error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// The no-op message, naming where the existing install lives.
fn already_installed_message(tag: &str, path: &Path) -> String {
    format!(
        "Nothing to do; {} is already at {}. Pass {} to reinstall.",
        tag.bold(),
        path.display().to_string().cyan(),
        "--force".bold()
    )
}

fn install(cli: &Cli) -> Result<InstallOutcome, InstallError> {
    let steam_root = resolve_steam_root(cli.steam_dir.as_deref())?;
    let request = InstallRequest {
        version: VersionToken::parse(cli.requested_version()),
        destination_root: compat_tools_dir(&steam_root),
        force: cli.force,
    };
    log_debug!("[Install] Request: {:?}", request);

    let fetcher = UreqFetcher::new();
    Installer::new(&fetcher, &cli.api_url, DEFAULT_TICK).install(&request)
}

fn resolve_steam_root(flag: Option<&str>) -> Result<PathBuf, InstallError> {
    match flag {
        Some(dir) => Ok(expand_tilde(dir)),
        None => default_steam_root().ok_or_else(|| InstallError::Io {
            context: "locating the default Steam directory".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "home directory is unknown; pass --steam-dir"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_steam_dir_wins() {
        assert_eq!(resolve_steam_root(Some("/opt/steam")).expect("root"), PathBuf::from("/opt/steam"));
    }

    #[test]
    fn already_installed_message_names_the_path() {
        let message = already_installed_message("GE-Proton9-20", Path::new("/s/compatibilitytools.d/GE-Proton9-20"));
        assert!(message.contains("GE-Proton9-20"));
        assert!(message.contains("/s/compatibilitytools.d/GE-Proton9-20"));
        assert!(message.contains("--force"));
    }

    #[test]
    fn default_steam_dir_comes_from_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolve_steam_root(None).expect("root"), home.join(".steam"));
        }
    }
}
