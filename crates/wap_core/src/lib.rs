//! Build pipeline for World of Warcraft addon packages.
//!
//! This crate turns a [`wap_project::Config`] and the addon sources next to it into
//! installable addon directories:
//!
//! - **TOC generation**: one manifest per game flavor, plus a flavor-neutral one
//! - **Include merging**: extra files (licenses, shared libraries) copied into addons
//! - **Dev linking**: symlinks from game AddOns directories to the build output
//! - **Watch mode**: rebuild and relink when tracked files change
//!
//! Nothing here prints. Non-fatal events are collected in a [`Report`].
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use wap_core::{Package, Report};
//! use wap_project::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config_path = Utf8Path::new("/projects/MyAddon/wap.json");
//! let config = Config::from_path(config_path)?;
//!
//! let mut report = Report::new();
//! let package = Package::create(&config, config_path, Utf8Path::new("/projects/MyAddon/dist"), &mut report)?;
//! for result in package.build(false, &mut report)? {
//!     println!("built {}", result.path);
//! }
//! for warning in report.warnings() {
//!     eprintln!("warning: {warning}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod addon;
pub mod error;
pub mod fileops;
pub mod install;
pub mod link;
pub mod package;
pub mod report;
pub mod toc;
pub mod utils;
pub mod watch;


pub use addon::{Addon, AddonBuildResult};
pub use error::{Error, ErrorKind, Result};
pub use install::AddonsPaths;
pub use link::{link_all, LinkChoice, LinkRequest};
pub use package::{build_path, Package};
pub use report::{Event, Report, Severity};
pub use toc::{BuildStamp, Toc, TocContext};
pub use watch::{spawn_watcher, BatchOutcome, ProjectState, WatchLoop, WatchState, WatchSummary};
