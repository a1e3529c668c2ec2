//! Storage module for persisting crawl data
//!
//! This module handles the files a run leaves behind:
//! - The JSON record set that later runs merge into
//! - Atomic file replacement shared with the state store

mod json;
mod traits;

pub use json::JsonArticleStore;
pub use traits::{ArticleStore, StorageError, StorageResult};

use std::io::Write;
use std::path::Path;

/// Replaces `path` with `contents` through a sibling temp file
///
/// Readers see either the old file or the complete new one. Missing parent
/// directories are created.
pub fn write_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let mut file = std::fs::File::create(tmp_path).map_err(|e| StorageError::io(tmp_path, e))?;
    file.write_all(contents)
        .and_then(|_| file.sync_all())
        .map_err(|e| StorageError::io(tmp_path, e))?;
    drop(file);

    std::fs::rename(tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(tmp_path);
        StorageError::io(path, e)
    })
}
