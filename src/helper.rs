use std::{
    fs,
    io::Write,
    path::Path,
};

use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, error, trace};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::{PromptError, Result};

/// Characters that are not allowed in a document file name.
const UNSAFE_FILE_CHARS: [char; 10] = [':', '/', '\\', '?', '%', '*', '|', '"', '<', '>'];

/// Byte budget for the title part of a document file name.
const MAX_TITLE_BYTES: usize = 200;

/// Extension of every document file.
pub const DOCUMENT_EXTENSION: &str = "md";

/// Current time truncated to whole seconds, the precision documents store.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Replaces every character that is unsafe in a file name with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_FILE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// File name of a prompt document: `<title>_<first 8 chars of id>.md`, sanitized.
///
/// The same title and id always give the same name, so a document can be found
/// from the metadata index alone. The title part is cut to at most
/// `MAX_TITLE_BYTES` bytes, on a character boundary, to stay under the usual
/// 255-byte file name limit.
pub fn document_file_name(title: &str, id: &Uuid) -> String {
    let id = id.to_string();
    let short_id = &id[..8];
    let title = sanitize_file_name(title);
    format!(
        "{}_{}.{}",
        truncate_to_bytes(&title, MAX_TITLE_BYTES),
        short_id,
        DOCUMENT_EXTENSION
    )
}

/// Longest prefix of `value` that fits in `max` bytes without splitting a character.
fn truncate_to_bytes(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

// Helper method for parsing tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Trims tags, drops empty ones and removes duplicates keeping the first occurrence.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !unique.iter().any(|t| t == tag) {
            unique.push(tag.to_string());
        }
    }
    unique
}

/// Writes `contents` to `path` by persisting a temporary file from the same directory.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.exists() {
        debug!("Creating parent directory: {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| {
            error!("Failed to create directory {}: {}", dir.display(), e);
            PromptError::DirectoryError {
                path: dir.to_path_buf(),
            }
        })?;
    }

    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Failed to create temporary file in {}: {}", dir.display(), e);
        PromptError::Io(e)
    })?;

    trace!("Writing {} bytes to temporary file", contents.len());
    temp_file.write_all(contents)?;
    temp_file.flush()?;

    temp_file.persist(path).map_err(|e| {
        error!("Failed to persist file {}: {}", path.display(), e.error);
        PromptError::Io(e.error)
    })?;

    trace!("Wrote {}", path.display());
    Ok(())
}
