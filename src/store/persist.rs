//! Collection files: one JSON array per collection, `<data_dir>/<name>.json`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::errors::{StoreError, StoreResult};
use super::Document;

fn collection_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", name))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Load every collection file in `dir`, creating the directory if needed
pub(crate) fn load_all(dir: &Path) -> StoreResult<HashMap<String, Vec<Document>>> {
    fs::create_dir_all(dir).map_err(io_error(dir))?;

    let mut collections = HashMap::new();

    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let bytes = fs::read(&path).map_err(io_error(&path))?;
        let docs: Vec<Document> =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Serialization {
                path: path.clone(),
                source,
            })?;

        debug!(collection = name, documents = docs.len(), "Loaded collection");
        collections.insert(name.to_string(), docs);
    }

    info!(dir = %dir.display(), collections = collections.len(), "Opened document store");
    Ok(collections)
}

/// Write a collection atomically (temp file + rename)
pub(crate) fn write_collection(dir: &Path, name: &str, docs: &[Document]) -> StoreResult<()> {
    let path = collection_path(dir, name);
    let tmp = dir.join(format!("{}.json.tmp", name));

    let bytes = serde_json::to_vec_pretty(docs).map_err(|source| StoreError::Serialization {
        path: path.clone(),
        source,
    })?;

    fs::write(&tmp, bytes).map_err(io_error(&tmp))?;
    fs::rename(&tmp, &path).map_err(io_error(&path))?;

    Ok(())
}
