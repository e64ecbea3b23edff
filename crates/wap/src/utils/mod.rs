use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use miette::Result;
use regex::Regex;
use wap_core::{Report, Severity};

use crate::errors::CliError;

pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Config file names, in discovery order.
const CONFIG_FILE_NAMES: [&str; 2] = ["wap.json", "wap.toml"];

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

pub fn is_valid_slug(name: impl AsRef<str>) -> bool {
    Regex::new(r"^[[:word:]-]+$")
        .map(|re| re.is_match(name.as_ref()))
        .unwrap_or(false)
}

pub fn validate_project_name(name: impl AsRef<str>) -> Result<()> {
    let name_str = name.as_ref();
    if !is_valid_slug(name_str) {
        return Err(CliError::InvalidProjectName {
            name: name_str.to_string(),
        }
        .into());
    }

    Ok(())
}

pub fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| CliError::io(".", e))?;
    Ok(Utf8PathBuf::from_path_buf(cwd).map_err(|_| CliError::NonUtf8CurrentDir)?)
}

/// Searches `start` and its ancestors for a config file, `wap.json` before `wap.toml`
/// in each directory.
pub fn find_config_path(start: &Utf8Path) -> Option<Utf8PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

/// The config file to use, as an absolute canonical path.
pub fn resolve_config_path(config_path: Option<Utf8PathBuf>) -> Result<Utf8PathBuf> {
    let path = match config_path {
        Some(path) => path,
        None => {
            let cwd = current_dir()?;
            find_config_path(&cwd).ok_or_else(|| CliError::config_not_found(cwd))?
        }
    };

    if !path.is_file() {
        return Err(CliError::ConfigPathMissing { path }.into());
    }
    Ok(path
        .canonicalize_utf8()
        .map_err(|e| CliError::io(path.clone(), e))?)
}

/// `output_dir` relative to the config file's directory, `dist` if not given.
pub fn resolve_output_dir(output_dir: Option<Utf8PathBuf>, config_path: &Utf8Path) -> Utf8PathBuf {
    let output_dir = output_dir.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR));
    match output_dir.is_absolute() {
        true => output_dir,
        false => config_path
            .parent()
            .unwrap_or(Utf8Path::new(""))
            .join(output_dir),
    }
}

/// Prints and clears the events of `report`.
pub fn render_report(report: &mut Report) {
    for event in report.drain() {
        match event.severity {
            Severity::Info => println_pad!("{} {}", "•".bright_blue(), event.message),
            Severity::Warning => eprintln!(
                "    {} {}",
                "⚠ warning:".bright_yellow().bold(),
                event.message.yellow()
            ),
            Severity::Error => eprintln!(
                "    {} {}",
                "✖ error:".bright_red().bold(),
                event.message.bright_red()
            ),
        }
    }
}
