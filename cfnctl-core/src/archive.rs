//! Zip packaging of a source directory for Lambda deployment.

use log::{debug, info};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{CfnctlError, CfnctlResult};

const ARCHIVE_EXTENSION: &str = "zip";
const DEFAULT_ARCHIVE_NAME: &str = "lambda";

/// Archive path for `output`, with `.zip` appended when it is missing.
pub fn archive_path(output: &Path) -> PathBuf {
    if output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
    {
        output.to_path_buf()
    } else {
        let mut name = output.as_os_str().to_os_string();
        name.push(".");
        name.push(ARCHIVE_EXTENSION);
        PathBuf::from(name)
    }
}

/// Default archive location for `source`: `<source>.zip` next to it.
pub fn default_archive_path(source: &Path) -> PathBuf {
    let source: PathBuf = source.components().collect();
    match source.file_name() {
        Some(_) => archive_path(&source),
        None => source.join(format!("{DEFAULT_ARCHIVE_NAME}.{ARCHIVE_EXTENSION}")),
    }
}

/// Zip every file under `source` into `output` and return the archive path.
///
/// Entry names are relative to `source` and use `/` separators. An archive
/// written inside `source` does not include itself.
pub fn zip_dir(source: &Path, output: &Path) -> CfnctlResult<PathBuf> {
    if !source.is_dir() {
        return Err(CfnctlError::invalid_input(format!(
            "'{}' is not a directory",
            source.display()
        )));
    }

    let output = archive_path(output);
    let file = File::create(&output).map_err(|e| CfnctlError::io("create archive", &output, e))?;
    let own_path = fs::canonicalize(&output).map_err(|e| CfnctlError::io("resolve", &output, e))?;

    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let archive_err = |message: String| CfnctlError::Archive {
        path: output.clone(),
        message,
    };

    let mut files = 0usize;
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| archive_err(e.to_string()))?;
        let path = entry.path();
        let Some(name) = entry_name(source, path) else {
            continue;
        };

        if entry.file_type().is_dir() {
            writer
                .add_directory(format!("{name}/"), options)
                .map_err(|e| archive_err(e.to_string()))?;
            continue;
        }

        if fs::canonicalize(path).is_ok_and(|p| p == own_path) {
            continue;
        }

        debug!("Adding {}", name);
        writer
            .start_file(name, options)
            .map_err(|e| archive_err(e.to_string()))?;
        let mut input = File::open(path).map_err(|e| CfnctlError::io("read", path, e))?;
        io::copy(&mut input, &mut writer).map_err(|e| CfnctlError::io("compress", path, e))?;
        files += 1;
    }

    writer.finish().map_err(|e| archive_err(e.to_string()))?;
    info!(
        "Packaged {} files from {} into {}",
        files,
        source.display(),
        output.display()
    );
    Ok(output)
}

// `None` for the root itself
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
