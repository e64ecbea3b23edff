use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use miette::Result;
use wap_core::{build_path, Report};
use wap_curseforge::{
    game_version_ids, uploaded_file_url, zip_dir, Changelog, CurseForgeApi, UploadMetadata,
};
use wap_project::{Config, CurseforgeConfig, ReleaseType};

use crate::errors::CliError;
use crate::println_pad;
use crate::utils::{render_report, resolve_config_path, resolve_output_dir};

const DEFAULT_RELEASE_TYPE: ReleaseType = ReleaseType::Alpha;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReleaseTypeArg {
    Alpha,
    Beta,
    Release,
}

impl From<ReleaseTypeArg> for ReleaseType {
    fn from(arg: ReleaseTypeArg) -> Self {
        match arg {
            ReleaseTypeArg::Alpha => ReleaseType::Alpha,
            ReleaseTypeArg::Beta => ReleaseType::Beta,
            ReleaseTypeArg::Release => ReleaseType::Release,
        }
    }
}

#[derive(Debug)]
pub struct PublishPackageArgs {
    pub config_path: Option<Utf8PathBuf>,
    pub output_dir: Option<Utf8PathBuf>,
    pub release_type: Option<ReleaseTypeArg>,
    pub curseforge_token: String,
}

pub fn publish_package(args: PublishPackageArgs) -> Result<()> {
    let config_path = resolve_config_path(args.config_path)?;
    let config = Config::from_path(&config_path).map_err(CliError::from)?;
    let output_dir = resolve_output_dir(args.output_dir, &config_path);

    let cf_config = config
        .publish
        .as_ref()
        .and_then(|publish| publish.curseforge.as_ref())
        .ok_or(CliError::MissingPublishConfig)?;

    let mut report = Report::new();
    let changelog = load_changelog(cf_config, &config_path, &mut report)?;

    let build_path = build_path(&output_dir, &config);
    if !build_path.is_dir() {
        return Err(CliError::BuildPathMissing { path: build_path }.into());
    }

    println_pad!(
        "{} {}",
        "🗜  Zipping".bright_blue().bold(),
        build_path.as_str().bright_white().bold()
    );
    let archive = zip_dir(&build_path).map_err(CliError::from)?;

    let api = CurseForgeApi::new(args.curseforge_token).map_err(CliError::from)?;

    println_pad!("{}", "🔎 Getting CurseForge WoW version ids...".bright_blue());
    let version_map = api.game_versions().map_err(CliError::from)?;
    let version_ids =
        game_version_ids(&config.wow_versions, &version_map).map_err(CliError::from)?;

    let release_type = match args.release_type.map(ReleaseType::from).or(cf_config.release_type) {
        Some(release_type) => release_type,
        None => {
            report.warn(format!(
                "No release type specified on command line or in config. Defaulting to {}",
                DEFAULT_RELEASE_TYPE.as_str()
            ));
            DEFAULT_RELEASE_TYPE
        }
    };
    render_report(&mut report);

    let display_name = build_path.file_name().unwrap_or(config.name.as_str());
    let metadata = UploadMetadata::new(changelog, display_name, version_ids, release_type);

    println_pad!("{}", "⬆  Uploading to CurseForge...".bright_blue());
    let file_id = api
        .upload(&cf_config.project_id, &archive, &metadata)
        .map_err(CliError::from)?;

    match &cf_config.slug {
        Some(slug) => println_pad!(
            "{} {}",
            "✅ Upload available at".bright_green().bold(),
            uploaded_file_url(slug, file_id).bright_white().underline()
        ),
        None => {
            println_pad!(
                "{} {}",
                "✅ Uploaded file".bright_green().bold(),
                file_id.to_string().bright_white().bold()
            );
            println_pad!(
                "{}",
                "Hint: Provide a \"slug\" in your curseforge config to get a link next time."
                    .bright_black()
            );
        }
    }

    Ok(())
}

fn load_changelog(
    cf_config: &CurseforgeConfig,
    config_path: &Utf8Path,
    report: &mut Report,
) -> Result<Changelog> {
    if let Some(file) = &cf_config.changelog_file {
        let path = config_path.parent().unwrap_or(Utf8Path::new("")).join(file);
        if cf_config.changelog_type.is_none() && Changelog::type_for_extension(&path).is_none() {
            report.warn(format!(
                "Unable to determine changelog type from extension for {path}, so assuming text"
            ));
        }
        return Ok(Changelog::from_path(&path, cf_config.changelog_type).map_err(CliError::from)?);
    }

    if let Some(text) = &cf_config.changelog_text {
        return Ok(Changelog::from_text(text.clone(), cf_config.changelog_type));
    }

    report.warn("No changelog text or file provided, so using empty string");
    Ok(Changelog::from_text("", None))
}
