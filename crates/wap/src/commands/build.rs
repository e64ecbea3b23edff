use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use miette::Result;
use wap_core::{
    link_all, spawn_watcher, AddonsPaths, BatchOutcome, LinkChoice, LinkRequest, Package, Report,
    WatchLoop,
};
use wap_project::Config;

use crate::errors::CliError;
use crate::println_pad;
use crate::utils::{render_report, resolve_config_path, resolve_output_dir};

#[derive(Debug)]
pub struct BuildPackageArgs {
    pub config_path: Option<Utf8PathBuf>,
    pub output_dir: Option<Utf8PathBuf>,
    pub clean: bool,
    pub link: Vec<LinkChoice>,
    pub link_force: bool,
    pub watch: bool,
    pub addons_paths: AddonsPaths,
}

/// Everything one build cycle needs. Shared by the initial build and watch rebuilds.
struct BuildCycle {
    config_path: Utf8PathBuf,
    output_dir: Utf8PathBuf,
    clean: bool,
    link: LinkRequest,
}

impl BuildCycle {
    /// Reads the config, builds and links. `tracked` is replaced with the new package's
    /// watch paths as soon as the package is resolved, even if building then fails.
    fn run(
        &self,
        report: &mut Report,
        tracked: &mut BTreeSet<Utf8PathBuf>,
    ) -> wap_core::Result<()> {
        let config = Config::from_path(&self.config_path)?;
        let package = Package::create(&config, &self.config_path, &self.output_dir, report)?;
        *tracked = package.watch_paths();
        tracked.insert(self.config_path.clone());

        let results = package.build(self.clean, report)?;
        for result in &results {
            report.info(format!("Built addon {}", result.path));
        }

        if !self.link.is_empty() {
            link_all(&results, &self.link, &config, report)?;
        }
        Ok(())
    }
}

pub fn build_package(args: BuildPackageArgs) -> Result<()> {
    // rejected before anything is built
    let link =
        LinkRequest::new(&args.link, args.link_force, args.addons_paths).map_err(CliError::from)?;

    let config_path = resolve_config_path(args.config_path)?;
    let output_dir = resolve_output_dir(args.output_dir, &config_path);

    let cycle = BuildCycle {
        config_path,
        output_dir,
        clean: args.clean,
        link,
    };

    println_pad!(
        "{} {}",
        "📦 Building package from".bright_blue().bold(),
        cycle.config_path.as_str().bright_cyan().bold()
    );

    let mut report = Report::new();
    let mut tracked = BTreeSet::new();
    let result = cycle.run(&mut report, &mut tracked);
    render_report(&mut report);
    result.map_err(CliError::from)?;

    println_pad!(
        "{}",
        "✅ Package built successfully!".bright_green().bold()
    );

    if args.watch {
        watch(&cycle, tracked)?;
    }

    Ok(())
}

fn watch(cycle: &BuildCycle, tracked: BTreeSet<Utf8PathBuf>) -> Result<()> {
    let project_dir = cycle
        .config_path
        .parent()
        .unwrap_or(Utf8Path::new("."))
        .to_owned();
    let (_watcher, batches) = spawn_watcher(&project_dir).map_err(CliError::from)?;

    println_pad!(
        "{} {} {}",
        "👀 Watching".bright_blue().bold(),
        project_dir.as_str().bright_white().bold(),
        "for changes (Ctrl-C to quit)".bright_blue()
    );

    let watch_loop = WatchLoop::new(
        tracked,
        |report: &mut Report, tracked: &mut BTreeSet<Utf8PathBuf>| cycle.run(report, tracked),
    );
    let summary = watch_loop.run(&batches, |outcome, report| {
        render_report(report);
        match outcome {
            BatchOutcome::Rebuilt => {
                println_pad!("{}", "✅ Rebuilt after change".bright_green().bold())
            }
            BatchOutcome::Failed => {
                println_pad!("{}", "❌ Rebuild failed, still watching".bright_red().bold())
            }
            BatchOutcome::Ignored | BatchOutcome::Unchanged => {}
        }
    });

    tracing::info!(?summary, "watch loop ended");
    Ok(())
}
