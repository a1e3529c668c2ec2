//! CSV export of the record set

use crate::article::Article;
use crate::storage::{write_atomic, StorageError, StorageResult};
use std::path::Path;

const HEADER: [&str; 3] = ["title", "date", "url"];

/// Writes `articles` as CSV with a `title,date,url` header
///
/// The header is written even for an empty set.
///
/// # Arguments
///
/// * `articles` - Records in output order
/// * `path` - Destination file, replaced atomically
pub fn write_csv(articles: &[Article], path: &Path) -> StorageResult<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .map_err(|e| StorageError::csv(path, e))?;

    for article in articles {
        writer
            .write_record([&article.title, &article.date, &article.url])
            .map_err(|e| StorageError::csv(path, e))?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| StorageError::io(path, e.into_error()))?;
    write_atomic(path, &data)?;

    tracing::info!("Saved {} articles to {}", articles.len(), path.display());
    Ok(())
}
