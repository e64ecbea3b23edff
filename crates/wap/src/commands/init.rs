use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use indexmap::IndexMap;
use miette::Result;
use wap_project::{AddonConfig, Config, Flavor, TagValue, TocConfig, SCHEMA_URL};

use crate::errors::CliError;
use crate::println_pad;
use crate::utils::{current_dir, validate_project_name};

#[derive(Debug, Clone)]
pub struct InitProjectArgs {
    pub name: String,
    pub author: Option<String>,
    pub output_dir: Option<Utf8PathBuf>,
}

pub fn init_project(args: InitProjectArgs) -> Result<()> {
    validate_project_name(&args.name)?;

    let parent = match args.output_dir {
        Some(output_dir) => output_dir,
        None => current_dir()?,
    };
    let project_dir = parent.join(&args.name);
    if project_dir.exists() {
        return Err(CliError::ProjectExists { path: project_dir }.into());
    }

    println_pad!(
        "{} {}",
        "🚀 Initializing new project:".bright_blue().bold(),
        args.name.bright_cyan().bold()
    );

    let config = create_default_config(&args.name, args.author);
    let config_json = config.to_json_pretty().map_err(CliError::from)?;

    write_file(&project_dir.join("wap.json"), &config_json)?;
    write_file(&project_dir.join("README.md"), &readme_text(&args.name))?;
    write_file(
        &project_dir.join(&args.name).join("Main.lua"),
        &main_lua_text(&args.name),
    )?;

    println_pad!(
        "{}\n{} {}",
        "Project initialized successfully!".bright_green().bold(),
        "Location:".bright_green(),
        project_dir.as_str().bright_white().bold()
    );

    Ok(())
}

fn write_file(path: &Utf8Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| CliError::io(path, e))?;
    Ok(())
}

fn create_default_config(name: &str, author: Option<String>) -> Config {
    let mut tags = IndexMap::new();
    tags.insert("Title".to_string(), TagValue::from(name));
    tags.insert(
        "Notes".to_string(),
        TagValue::from("Short description of the addon"),
    );

    Config {
        schema: Some(SCHEMA_URL.to_string()),
        name: name.to_string(),
        version: "0.0.1".to_string(),
        author,
        description: None,
        wow_versions: Flavor::ALL
            .into_iter()
            .map(|flavor| (flavor, flavor.latest_version().to_string()))
            .collect(),
        publish: None,
        package: vec![AddonConfig {
            path: format!("./{name}"),
            toc: Some(TocConfig {
                tags,
                files: vec!["Main.lua".to_string()],
            }),
            include: vec![],
        }],
    }
}

fn readme_text(name: &str) -> String {
    format!("# {name}\n\nThis addon helps you...\n")
}

fn main_lua_text(name: &str) -> String {
    format!(
        "-- Your code can go here.\n\
         -- Here's something to get you started, but you can erase it if you wish.\n\
         \n\
         local title = GetAddOnMetadata(\"{name}\", \"Title\")\n\
         local version = GetAddOnMetadata(\"{name}\", \"Version\")\n\
         print(title .. \" version \" .. version .. \" has loaded\")\n"
    )
}
