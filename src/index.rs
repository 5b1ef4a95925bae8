//! The metadata index: one JSON file listing every prompt without its body.
//!
//! Loading from the index avoids decoding every document at startup. Bodies
//! are still read from the documents, located by their deterministic file
//! names.
use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{document_file_name, read_body, write_atomically, Category, Prompt, Result};

/// A prompt without its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

impl IndexEntry {
    /// Rebuilds the full prompt once the body is known.
    pub fn into_prompt(self, body: String) -> Prompt {
        Prompt {
            id: self.id,
            title: self.title,
            body,
            category: self.category,
            tags: self.tags,
            created_at: self.created_at,
            modified_at: self.modified_at.max(self.created_at),
            is_favorite: self.is_favorite,
        }
    }

    pub fn file_name(&self) -> String {
        document_file_name(&self.title, &self.id)
    }
}

impl From<&Prompt> for IndexEntry {
    fn from(prompt: &Prompt) -> Self {
        IndexEntry {
            id: prompt.id,
            title: prompt.title.clone(),
            category: prompt.category,
            is_favorite: prompt.is_favorite,
            created_at: prompt.created_at,
            modified_at: prompt.modified_at,
            tags: prompt.tags.clone(),
        }
    }
}

/// The index file together with the directory holding the full documents.
#[derive(Debug, Clone)]
pub struct MetadataIndex {
    path: PathBuf,
    documents_dir: PathBuf,
}

impl MetadataIndex {
    pub fn new(path: PathBuf, documents_dir: PathBuf) -> Self {
        Self {
            path,
            documents_dir,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the index with the projection of `prompts`.
    pub fn save(&self, prompts: &[Prompt]) -> Result<()> {
        let entries: Vec<IndexEntry> = prompts.iter().map(IndexEntry::from).collect();
        let json = serde_json::to_string_pretty(&entries)?;
        write_atomically(&self.path, json.as_bytes())?;
        debug!("Wrote index with {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Loads the prompts listed in the index.
    ///
    /// Fails only when the index file is missing or is not a list of entries.
    /// An entry whose document is missing or malformed is dropped.
    pub fn load(&self) -> Result<Vec<Prompt>> {
        let json = fs::read_to_string(&self.path)?;
        let entries: Vec<IndexEntry> = serde_json::from_str(&json)?;
        let listed = entries.len();

        let prompts: Vec<Prompt> = entries
            .into_iter()
            .filter_map(|entry| {
                let doc_path = self.documents_dir.join(entry.file_name());
                match read_body(&doc_path) {
                    Ok(body) => Some(entry.into_prompt(body)),
                    Err(e) => {
                        warn!(
                            "Dropping index entry {} ({}): cannot read {}: {}",
                            entry.id,
                            entry.title,
                            doc_path.display(),
                            e
                        );
                        None
                    }
                }
            })
            .collect();

        info!(
            "Loaded {} of {} prompts from index {}",
            prompts.len(),
            listed,
            self.path.display()
        );
        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode_document;
    use tempfile::tempdir;

    fn prompt(title: &str, body: &str) -> Prompt {
        Prompt::new(title.to_string(), body.to_string(), Category::Analysis, vec!["t".to_string()])
    }

    #[test]
    fn save_then_load_rebuilds_prompts() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("prompts");
        let index = MetadataIndex::new(dir.path().join("metadata.json"), docs.clone());

        let mut first = prompt("First: one", "body one");
        first.is_favorite = true;
        let second = prompt("Second", "body {{two}}");
        for p in [&first, &second] {
            write_atomically(&docs.join(document_file_name(&p.title, &p.id)), encode_document(p).as_bytes()).unwrap();
        }

        index.save(&[first.clone(), second.clone()]).unwrap();
        let loaded = index.load().unwrap();

        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn entries_without_documents_are_dropped() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("prompts");
        let index = MetadataIndex::new(dir.path().join("metadata.json"), docs.clone());

        let present = prompt("Present", "here");
        let missing = prompt("Missing", "gone");
        let broken = prompt("Broken", "bad");
        write_atomically(
            &docs.join(document_file_name(&present.title, &present.id)),
            encode_document(&present).as_bytes(),
        )
        .unwrap();
        write_atomically(
            &docs.join(document_file_name(&broken.title, &broken.id)),
            b"# no frontmatter at all",
        )
        .unwrap();

        index.save(&[present.clone(), missing, broken]).unwrap();
        assert_eq!(index.load().unwrap(), vec![present]);
    }

    #[test]
    fn load_fails_without_a_readable_index() {
        let dir = tempdir().unwrap();
        let index = MetadataIndex::new(dir.path().join("metadata.json"), dir.path().to_path_buf());
        assert!(index.load().is_err());

        fs::write(index.path(), "{\"not\": \"a list\"}").unwrap();
        assert!(index.load().is_err());

        fs::write(index.path(), "[]").unwrap();
        assert!(index.load().unwrap().is_empty());
    }

    #[test]
    fn index_entries_use_camel_case_keys() {
        let p = prompt("T", "B");
        let json = serde_json::to_value(IndexEntry::from(&p)).unwrap();
        for key in ["id", "title", "category", "isFavorite", "createdAt", "modifiedAt", "tags"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert!(json.get("body").is_none());
        assert_eq!(json["category"], "Analysis");
    }
}
