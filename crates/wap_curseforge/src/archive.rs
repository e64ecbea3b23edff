use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::{Seek, Write};
use walkdir::WalkDir;
use zip::{write::SimpleFileOptions, ZipWriter};

use crate::error::{Error, Result};

/// Path of the archive `zip_dir` writes for `dir`: `<dir>.zip`.
pub fn archive_path(dir: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{}.zip", dir.as_str().trim_end_matches(['/', '\\'])))
}

/// Zips every file under `dir` into `<dir>.zip`, replacing any previous archive.
pub fn zip_dir(dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let path = archive_path(dir);
    let file = File::create(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    write_zip(file, dir)?;
    tracing::debug!(%path, "wrote archive");
    Ok(path)
}

/// Writes the files under `dir` to `writer`, entry names relative to `dir` using `/`.
pub fn write_zip<W: Write + Seek>(writer: W, dir: &Utf8Path) -> Result<()> {
    let mut zip = ZipWriter::new(writer);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io {
            path: dir.to_owned(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let io_err = |source| Error::Io {
            path: Utf8PathBuf::from(entry.path().to_string_lossy().into_owned()),
            source,
        };
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| io_err(std::io::Error::other(e)))?;
        let name = relative.to_string_lossy().replace('\\', "/");

        zip.start_file(name, options)?;
        let mut file = File::open(entry.path()).map_err(io_err)?;
        std::io::copy(&mut file, &mut zip).map_err(io_err)?;
    }

    zip.finish()?;
    Ok(())
}
