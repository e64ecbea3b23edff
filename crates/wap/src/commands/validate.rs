use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;
use wap_project::Config;

use crate::errors::CliError;
use crate::println_pad;
use crate::utils::resolve_config_path;

#[derive(Debug)]
pub struct ValidateConfigArgs {
    pub config_path: Option<Utf8PathBuf>,
}

pub fn validate_config(args: ValidateConfigArgs) -> Result<()> {
    let config_path = resolve_config_path(args.config_path)?;

    match Config::from_path(&config_path) {
        Ok(_) => {
            println_pad!(
                "{} {}",
                config_path.as_str().bright_white().bold(),
                "is valid".bright_green().bold()
            );
            Ok(())
        }
        Err(err) => {
            println_pad!(
                "{} {}",
                config_path.as_str().bright_white().bold(),
                "is invalid".bright_red().bold()
            );
            Err(CliError::from(err).into())
        }
    }
}
