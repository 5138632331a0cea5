//! Unpacking stored completions into programs that can be built.

use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::error::InternalError;

/// One archived problem with the completions generated for it.
#[derive(Debug, Deserialize)]
struct Record {
    prompt: String,
    tests: String,
    #[serde(default)]
    completions: Vec<String>,
}

/// File name prefix shared by everything unpacked from `archive`.
fn base_name(archive: &Path) -> String {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    let name = name.strip_suffix(".json").unwrap_or(name);
    name.to_string()
}

/// Write `<base><i>.cbl` for each completion and `<base>_test.cbl` for the
/// tests alone, returning the files written.
///
/// Files that cannot be written are logged and skipped.
pub fn extract(archive: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, InternalError> {
    let file = File::open(archive).map_err(|e| {
        InternalError::AnyMsg(format!("cannot open {}: {}", archive.display(), e))
    })?;
    let record: Record = serde_json::from_reader(BufReader::new(GzDecoder::new(file)))
        .map_err(|e| {
            InternalError::AnyMsg(format!("{} is not a gzip JSON record: {}", archive.display(), e))
        })?;
    fs::create_dir_all(output_dir)?;

    let base = base_name(archive);
    let programs = record
        .completions
        .iter()
        .enumerate()
        .map(|(i, completion)| {
            (
                output_dir.join(format!("{}{}.cbl", base, i)),
                format!("{}{}{}", record.prompt, completion, record.tests),
            )
        })
        .chain([(
            output_dir.join(format!("{}_test.cbl", base)),
            record.tests.clone(),
        )]);

    let mut written = vec![];
    for (path, text) in programs {
        match fs::write(&path, text) {
            Ok(()) => {
                log::info!("wrote {}", path.display());
                written.push(path);
            }
            Err(e) => log::warn!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(written)
}
