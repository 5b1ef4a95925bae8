use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use log::{debug, error, info, trace, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{
    convert_to_prompt, dedup_tags, document_file_name, encode_document, encode_simplified,
    read_document, sample_prompts, timestamp_now, write_atomically, Category, Config, LoadSource,
    MetadataIndex, Prompt, PromptError, Result, SaveReport, DOCUMENT_EXTENSION,
};

/// Steps of the startup load. Each step either produces the prompts or hands
/// over to the next one; `Seed` always finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    TryIndex,
    TryScan,
    Seed,
}

/// Owns the prompts of the running session and their on-disk representation.
///
/// The in-memory list is the source of truth. Every mutation rewrites all
/// documents, the simplified copies and the metadata index, then removes
/// stale documents from the prompts directory.
pub struct PromptStore {
    /// Application configuration
    config: Config,

    /// Metadata index used for the fast startup path
    index: MetadataIndex,

    /// Prompts of the running session
    prompts: Vec<Prompt>,

    /// Report of the most recent save pass
    last_report: SaveReport,
}

impl PromptStore {
    /// Creates the data directories and loads the prompts.
    ///
    /// Loading tries the metadata index first, then decodes the documents in
    /// the prompts directory, and writes the sample prompts when neither
    /// yields anything.
    pub fn open(config: Config) -> Result<(Self, LoadSource)> {
        info!(
            "Opening prompt store: data_dir={}, resources_dir={}",
            config.data_dir.display(),
            config.resources_dir.display()
        );

        ensure_dir(&config.data_dir)?;
        ensure_dir(&config.prompts_dir())?;

        let index = MetadataIndex::new(config.index_path(), config.prompts_dir());
        let mut store = Self {
            config,
            index,
            prompts: Vec::new(),
            last_report: SaveReport::default(),
        };

        let source = store.reload();
        Ok((store, source))
    }

    /// Replaces the in-memory prompts with what is on disk.
    pub fn reload(&mut self) -> LoadSource {
        let mut state = LoadState::TryIndex;
        loop {
            debug!("Load state: {:?}", state);
            state = match state {
                LoadState::TryIndex => match self.index.load() {
                    Ok(prompts) => {
                        self.prompts = prompts;
                        return LoadSource::Index;
                    }
                    Err(e) => {
                        warn!(
                            "Metadata index {} unavailable, scanning documents: {}",
                            self.index.path().display(),
                            e
                        );
                        LoadState::TryScan
                    }
                },
                LoadState::TryScan => {
                    let prompts = self.scan_documents();
                    if prompts.is_empty() {
                        LoadState::Seed
                    } else {
                        info!("Recovered {} prompts from documents", prompts.len());
                        self.prompts = prompts;
                        // Recovered documents may sit under names the index cannot
                        // derive; rewrite them under their canonical names.
                        self.save();
                        return LoadSource::Scan;
                    }
                }
                LoadState::Seed => {
                    info!("No prompts found, writing sample prompts");
                    self.prompts = sample_prompts();
                    self.save();
                    return LoadSource::Seed;
                }
            };
        }
    }

    /// Decodes every document in the prompts directory, skipping those that fail.
    ///
    /// When two documents carry the same id the most recently modified one wins.
    fn scan_documents(&self) -> Vec<Prompt> {
        let dir = self.config.prompts_dir();
        let mut by_id: HashMap<Uuid, Prompt> = HashMap::new();
        let mut skipped = 0usize;

        for path in document_paths(&dir) {
            match read_document(&path) {
                Ok(prompt) => {
                    let newer = by_id
                        .get(&prompt.id)
                        .map_or(true, |existing| prompt.modified_at > existing.modified_at);
                    if newer {
                        by_id.insert(prompt.id, prompt);
                    } else {
                        debug!("Ignoring older copy of prompt {} in {}", prompt.id, path.display());
                    }
                }
                Err(e) => {
                    warn!("Skipping document {}: {}", path.display(), e);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!("Skipped {} undecodable documents in {}", skipped, dir.display());
        }

        let mut prompts: Vec<Prompt> = by_id.into_values().collect();
        prompts.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        prompts
    }

    /// Writes every prompt, the metadata index, and removes orphaned documents.
    ///
    /// Failures on individual files are logged and collected in the returned
    /// report; they never stop the remaining writes.
    pub fn save(&mut self) -> &SaveReport {
        let mut report = SaveReport::default();
        let prompts_dir = self.config.prompts_dir();
        let resources_dir = &self.config.resources_dir;

        for prompt in &self.prompts {
            let file_name = document_file_name(&prompt.title, &prompt.id);

            let doc_path = prompts_dir.join(&file_name);
            match write_atomically(&doc_path, encode_document(prompt).as_bytes()) {
                Ok(()) => report.documents_written += 1,
                Err(e) => {
                    error!("Failed to write document {}: {}", doc_path.display(), e);
                    report.failures.push((doc_path, e.to_string()));
                }
            }

            let copy_path = resources_dir.join(&file_name);
            match write_atomically(&copy_path, encode_simplified(prompt).as_bytes()) {
                Ok(()) => report.simplified_written += 1,
                Err(e) => {
                    error!("Failed to write simplified copy {}: {}", copy_path.display(), e);
                    report.failures.push((copy_path, e.to_string()));
                }
            }
        }

        match self.index.save(&self.prompts) {
            Ok(()) => report.index_written = true,
            Err(e) => {
                error!("Failed to write metadata index: {}", e);
                report
                    .failures
                    .push((self.index.path().to_path_buf(), e.to_string()));
            }
        }

        self.remove_orphans(&mut report);

        if report.is_clean() {
            debug!(
                "Saved {} prompts ({} orphans removed)",
                report.documents_written,
                report.orphans_removed.len()
            );
        } else {
            warn!("Save finished with {} failures", report.failures.len());
        }

        self.last_report = report;
        &self.last_report
    }

    /// Deletes every document in the prompts directory that no live prompt maps to.
    fn remove_orphans(&self, report: &mut SaveReport) {
        let expected: HashSet<String> = self
            .prompts
            .iter()
            .map(|p| document_file_name(&p.title, &p.id))
            .collect();

        for path in document_paths(&self.config.prompts_dir()) {
            let is_live = path
                .file_name()
                .map(|name| expected.contains(&*name.to_string_lossy()))
                .unwrap_or(true);
            if is_live {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed orphaned document {}", path.display());
                    report.orphans_removed.push(path);
                }
                Err(e) => {
                    warn!("Failed to remove orphaned document {}: {}", path.display(), e);
                    report.failures.push((path, e.to_string()));
                }
            }
        }
    }

    /// Prompts ordered by modification time, most recent first.
    pub fn list(&self) -> Vec<Prompt> {
        let mut prompts = self.prompts.clone();
        prompts.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        prompts
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn get(&self, id: &Uuid) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == *id)
    }

    /// Finds a prompt by full id or by an unambiguous id prefix.
    pub fn resolve(&self, query: &str) -> Result<&Prompt> {
        let query = query.trim().to_lowercase();
        if let Ok(id) = Uuid::parse_str(&query) {
            return self.get(&id).ok_or(PromptError::PromptNotFound { id: query });
        }

        if query.is_empty() {
            return Err(PromptError::PromptNotFound { id: query });
        }

        let matches: Vec<&Prompt> = self
            .prompts
            .iter()
            .filter(|p| p.id.to_string().starts_with(&query))
            .collect();
        match matches.as_slice() {
            [prompt] => Ok(prompt),
            [] => Err(PromptError::PromptNotFound { id: query }),
            _ => Err(PromptError::ApplicationError {
                message: format!("Prompt id prefix '{}' is ambiguous", query),
            }),
        }
    }

    /// Report of the most recent save pass.
    pub fn last_save_report(&self) -> &SaveReport {
        &self.last_report
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates and persists a new prompt.
    pub fn add(
        &mut self,
        title: String,
        body: String,
        category: Category,
        tags: Vec<String>,
    ) -> Result<Prompt> {
        self.insert(Prompt::new(title, body, category, tags))
    }

    /// Persists an already constructed prompt. Its id must be new.
    pub fn insert(&mut self, prompt: Prompt) -> Result<Prompt> {
        if self.get(&prompt.id).is_some() {
            return Err(PromptError::PromptAlreadyExists {
                id: prompt.id.to_string(),
            });
        }

        let prompt = normalize(prompt)?;
        info!("Adding prompt {} ({})", prompt.id, prompt.title);
        self.prompts.push(prompt.clone());
        self.save();
        Ok(prompt)
    }

    /// Replaces the stored prompt that has the same id.
    ///
    /// `created_at` cannot change. `modified_at` is set to now when any stored
    /// value differs, and kept otherwise.
    pub fn update(&mut self, prompt: Prompt) -> Result<Prompt> {
        let position = self
            .position(&prompt.id)
            .ok_or_else(|| PromptError::PromptNotFound {
                id: prompt.id.to_string(),
            })?;

        let existing = &self.prompts[position];
        if prompt.created_at != existing.created_at {
            return Err(PromptError::InvalidPrompt {
                message: format!("cannot change the creation time of prompt {}", prompt.id),
            });
        }

        let mut prompt = normalize(prompt)?;
        if prompt.content_differs(existing) {
            prompt.modified_at = timestamp_now().max(existing.modified_at);
        } else {
            trace!("Prompt {} unchanged", prompt.id);
            prompt.modified_at = existing.modified_at;
        }

        info!("Updating prompt {}", prompt.id);
        self.prompts[position] = prompt.clone();
        self.save();
        Ok(prompt)
    }

    /// Removes a prompt; its document disappears with the next orphan cleanup.
    pub fn delete(&mut self, id: &Uuid) -> Result<Prompt> {
        let position = self
            .position(id)
            .ok_or_else(|| PromptError::PromptNotFound { id: id.to_string() })?;

        let removed = self.prompts.remove(position);
        info!("Deleting prompt {} ({})", removed.id, removed.title);
        self.save();
        Ok(removed)
    }

    /// Flips the favorite flag and returns the new value.
    pub fn toggle_favorite(&mut self, id: &Uuid) -> Result<bool> {
        let position = self
            .position(id)
            .ok_or_else(|| PromptError::PromptNotFound { id: id.to_string() })?;

        let prompt = &mut self.prompts[position];
        prompt.toggle_favorite();
        let favorite = prompt.is_favorite;
        debug!("Prompt {} favorite: {}", id, favorite);
        self.save();
        Ok(favorite)
    }

    /// Converts an idea into a new prompt and persists it.
    pub fn convert_idea(&mut self, id: &Uuid) -> Result<Prompt> {
        let idea = self
            .get(id)
            .ok_or_else(|| PromptError::PromptNotFound { id: id.to_string() })?;
        let converted = convert_to_prompt(idea);
        self.insert(converted)
    }

    fn position(&self, id: &Uuid) -> Option<usize> {
        self.prompts.iter().position(|p| p.id == *id)
    }
}

/// Trims title and body and removes duplicate tags. The title must not be empty.
fn normalize(mut prompt: Prompt) -> Result<Prompt> {
    let title = prompt.title.trim();
    if title.is_empty() {
        return Err(PromptError::InvalidPrompt {
            message: "title must not be empty".to_string(),
        });
    }
    prompt.title = title.to_string();
    prompt.body = prompt.body.trim().to_string();
    prompt.tags = dedup_tags(prompt.tags);
    prompt.modified_at = prompt.modified_at.max(prompt.created_at);
    Ok(prompt)
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        debug!("Creating directory: {}", path.display());
        fs::create_dir_all(path).map_err(|e| {
            error!("Failed to create directory {}: {}", path.display(), e);
            PromptError::DirectoryError {
                path: path.to_path_buf(),
            }
        })?;
    }
    Ok(())
}

/// Document files directly inside `dir`.
fn document_paths(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION)
        })
        .collect()
}
