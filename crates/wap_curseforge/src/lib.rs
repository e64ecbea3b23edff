//! Publishing wap packages to CurseForge.
//!
//! A built package directory is zipped with [`zip_dir`] and uploaded with
//! [`CurseForgeApi::upload`], tagged with the CurseForge ids of the package's game
//! versions.

pub mod archive;
pub mod changelog;
pub mod client;
pub mod error;

pub use archive::{archive_path, zip_dir};
pub use changelog::Changelog;
pub use client::{
    game_version_ids, uploaded_file_url, version_map, CurseForgeApi, GameVersion, UploadMetadata,
};
pub use error::{Error, Result};
