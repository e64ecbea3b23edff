use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    build_package, init_project, publish_package, validate_config, BuildPackageArgs,
    InitProjectArgs, PublishPackageArgs, ReleaseTypeArg, ValidateConfigArgs,
};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;
use wap_core::{AddonsPaths, LinkChoice};
use wap_project::Flavor;

mod commands;
mod errors;
mod utils;

/// Environment variable holding the log filter, e.g. `WAP_LOG=wap_core=debug`.
const LOG_ENV: &str = "WAP_LOG";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the package into the output directory
    Build {
        /// The path to the wap config file
        #[arg(short, long)]
        config_path: Option<Utf8PathBuf>,

        /// The directory to build into
        #[arg(short, long)]
        output_dir: Option<Utf8PathBuf>,

        /// Empty each addon's output directory before building
        #[arg(long)]
        clean: bool,

        /// Link built addons into the game's AddOns directories. Takes a flavor name or
        /// "auto" (the default when given without a value). May be repeated.
        #[arg(short, long, num_args = 0..=1, default_missing_value = "auto")]
        link: Vec<LinkChoice>,

        /// Replace existing links or directories in the AddOns directories
        #[arg(long)]
        link_force: bool,

        /// Rebuild whenever a project file changes
        #[arg(short, long)]
        watch: bool,

        /// AddOns directory for the mainline (retail) client
        #[arg(long)]
        mainline_addons_path: Option<Utf8PathBuf>,

        /// AddOns directory for the wrath client
        #[arg(long)]
        wrath_addons_path: Option<Utf8PathBuf>,

        /// AddOns directory for the vanilla (classic era) client
        #[arg(long)]
        vanilla_addons_path: Option<Utf8PathBuf>,
    },
    /// Upload a built package to CurseForge
    Publish {
        /// The path to the wap config file
        #[arg(short, long)]
        config_path: Option<Utf8PathBuf>,

        /// The directory the package was built into
        #[arg(short, long)]
        output_dir: Option<Utf8PathBuf>,

        /// Overrides the release type from the config
        #[arg(short, long, value_enum)]
        release_type: Option<ReleaseTypeArg>,

        /// CurseForge API token
        #[arg(long, env = "WAP_CURSEFORGE_TOKEN", hide_env_values = true)]
        curseforge_token: String,
    },
    /// Check a config file without building anything
    Validate {
        /// The path to the wap config file
        #[arg(short, long)]
        config_path: Option<Utf8PathBuf>,
    },
    /// Create a new project
    Init {
        /// Project name, also used as the addon directory name
        #[arg(short, long)]
        name: String,

        /// Author written into the config
        #[arg(short, long)]
        author: Option<String>,

        /// The directory to create the project in
        #[arg(short, long)]
        output_dir: Option<Utf8PathBuf>,
    },
}

fn parse_args() -> Result<Args> {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).into_diagnostic()
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

fn addons_paths(overrides: [(Flavor, Option<Utf8PathBuf>); 3]) -> AddonsPaths {
    let mut paths = AddonsPaths::new();
    for (flavor, path) in overrides {
        if let Some(path) = path {
            paths.set_override(flavor, path);
        }
    }
    paths
}

fn main() -> Result<()> {
    let args = parse_args()?;
    init_logging(args.verbose);

    match args.command {
        Commands::Build {
            config_path,
            output_dir,
            clean,
            link,
            link_force,
            watch,
            mainline_addons_path,
            wrath_addons_path,
            vanilla_addons_path,
        } => build_package(BuildPackageArgs {
            config_path,
            output_dir,
            clean,
            link,
            link_force,
            watch,
            addons_paths: addons_paths([
                (Flavor::Mainline, mainline_addons_path),
                (Flavor::Wrath, wrath_addons_path),
                (Flavor::Vanilla, vanilla_addons_path),
            ]),
        }),
        Commands::Publish {
            config_path,
            output_dir,
            release_type,
            curseforge_token,
        } => publish_package(PublishPackageArgs {
            config_path,
            output_dir,
            release_type,
            curseforge_token,
        }),
        Commands::Validate { config_path } => validate_config(ValidateConfigArgs { config_path }),
        Commands::Init {
            name,
            author,
            output_dir,
        } => init_project(InitProjectArgs {
            name,
            author,
            output_dir,
        }),
    }
}
