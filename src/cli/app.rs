//! CLI module for the promptex application
//!
//! This module handles the command-line interface for interacting with the
//! prompt store.
use std::{
    collections::HashMap,
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, info};
use shell_words::split;
use tempfile::Builder;

use crate::{
    encode_document, extract_placeholders, parse_tags, replace_placeholders, ActivityEvent,
    CaptureKind, Category, Commands, Config, EventBus, Prompt, PromptError, PromptFilter,
    PromptStore, Result,
};

/// CLI Application handler - processes CLI commands and interfaces with PromptStore
pub struct App {
    /// The prompt store backend
    store: PromptStore,

    /// Application configuration
    config: Config,

    /// Where the configuration is read from and written to
    config_path: Option<PathBuf>,

    /// Activity notifications for this session
    events: EventBus,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given store and config
    pub fn new(
        store: PromptStore,
        config: Config,
        config_path: Option<PathBuf>,
        verbose: bool,
    ) -> Self {
        let mut events = EventBus::new();
        events.subscribe(|event| debug!("Activity: {:?}", event));
        if verbose {
            events.subscribe(|event| println!("{}", console::style(format!("[{:?}]", event)).dim()));
        }

        Self {
            store,
            config,
            config_path,
            events,
            verbose,
        }
    }

    /// Registers an additional activity listener.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Run the CLI application with the given command
    pub fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::List {
                search,
                category,
                favorites,
                json,
            } => self.list_prompts(search, category, favorites, json)?,

            Commands::Show { id, document } => self.show_prompt(&id, document)?,

            Commands::Add {
                title,
                body,
                file,
                category,
                tags,
            } => self.add_prompt(title, body, file, &category, tags)?,

            Commands::Capture { text, idea } => self.capture(&text, idea)?,

            Commands::Edit {
                id,
                title,
                body,
                category,
                add_tags,
                remove_tags,
                editor,
            } => self.handle_edit(&id, title, body, category, add_tags, remove_tags, editor)?,

            Commands::Delete { id, force } => self.handle_delete(&id, force)?,

            Commands::Favorite { id } => self.toggle_favorite(&id)?,

            Commands::Convert { id } => self.convert_idea(&id)?,

            Commands::Placeholders { id } => self.list_placeholders(&id)?,

            Commands::Fill {
                id,
                values,
                no_input,
            } => self.fill_placeholders(&id, values, no_input)?,

            Commands::Config { show, reset } => self.handle_config(show, reset)?,
        }

        Ok(())
    }

    fn list_prompts(
        &self,
        search: Option<String>,
        category: Option<String>,
        favorites: bool,
        json: bool,
    ) -> Result<()> {
        let mut filter = PromptFilter::new();
        if let Some(text) = search {
            filter.set_search_text(text);
        }
        if let Some(name) = category {
            filter.set_category(Some(parse_category(&name)?));
        }
        filter.set_favorites_only(favorites);

        let prompts = filter.apply(self.store.prompts());

        if json {
            println!("{}", serde_json::to_string_pretty(&prompts)?);
            return Ok(());
        }

        if prompts.is_empty() {
            println!("No prompts found matching the criteria.");
            return Ok(());
        }

        self.display_prompts_text(&prompts);
        println!(
            "\nFound {} prompt{}",
            prompts.len(),
            if prompts.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    /// Display prompts in text format
    fn display_prompts_text(&self, prompts: &[Prompt]) {
        // Use terminal width for formatting if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, prompt) in prompts.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            let star = if prompt.is_favorite { "★ " } else { "" };
            println!(
                "{}{} {}",
                star,
                console::style(&prompt.title).bold(),
                console::style(format!("[{}]", &prompt.id.to_string()[..8])).dim()
            );
            println!(
                "{} {} | Modified: {}",
                prompt.category.icon(),
                prompt.category,
                prompt.modified_at.format("%Y-%m-%d %H:%M")
            );

            if !prompt.tags.is_empty() {
                let tags = prompt
                    .tags
                    .iter()
                    .map(|tag| format!("#{}", tag))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("Tags: {}", console::style(tags).cyan());
            }

            let preview = self.get_content_preview(&prompt.body, 100);
            if !preview.is_empty() {
                println!("{}", preview);
            }
        }
    }

    /// Generate a content preview for displaying brief prompts
    fn get_content_preview(&self, content: &str, max_len: usize) -> String {
        let first_line = content
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("");

        if first_line.chars().count() <= max_len {
            first_line.to_string()
        } else {
            let cut: String = first_line.chars().take(max_len).collect();
            format!("{}...", cut)
        }
    }

    fn show_prompt(&self, id: &str, document: bool) -> Result<()> {
        let prompt = self.store.resolve(id)?;

        if document {
            print!("{}", encode_document(prompt));
            return Ok(());
        }

        println!("ID:       {}", prompt.id);
        println!("Title:    {}", console::style(&prompt.title).bold());
        println!("Category: {} {}", prompt.category.icon(), prompt.category);
        println!("Favorite: {}", if prompt.is_favorite { "yes" } else { "no" });
        println!("Created:  {}", prompt.created_at.format("%Y-%m-%d %H:%M:%S"));
        println!("Modified: {}", prompt.modified_at.format("%Y-%m-%d %H:%M:%S"));
        if !prompt.tags.is_empty() {
            println!("Tags:     {}", prompt.tags.join(", "));
        }

        let placeholders = extract_placeholders(&prompt.body);
        if !placeholders.is_empty() {
            println!("Placeholders: {}", placeholders.join(", "));
        }

        println!("\n{}", prompt.body);
        Ok(())
    }

    fn add_prompt(
        &mut self,
        title: String,
        body: Option<String>,
        file: Option<PathBuf>,
        category: &str,
        tags: Option<String>,
    ) -> Result<()> {
        let category = parse_category(category)?;
        let body = match (body, file) {
            (Some(_), Some(_)) => {
                return Err(PromptError::ApplicationError {
                    message: "Cannot specify both --body and --file options".to_string(),
                });
            }
            (Some(b), None) => b,
            (None, Some(path)) => self.read_content_from_file(&path)?,
            (None, None) => String::new(),
        };

        let prompt = self.store.add(title, body, category, parse_tags(tags))?;
        self.report_save();
        self.events.emit(ActivityEvent::Created { id: prompt.id });

        println!("Prompt created with ID: {}", prompt.id);
        Ok(())
    }

    fn capture(&mut self, text: &str, idea: bool) -> Result<()> {
        let kind = if idea { CaptureKind::Idea } else { CaptureKind::Prompt };
        let prompt = Prompt::quick_capture(text, kind).ok_or_else(|| PromptError::InvalidPrompt {
            message: "nothing to capture".to_string(),
        })?;

        let prompt = self.store.insert(prompt)?;
        self.report_save();
        self.events.emit(ActivityEvent::Created { id: prompt.id });

        println!(
            "Captured {} '{}' ({})",
            if idea { "idea" } else { "prompt" },
            prompt.title,
            prompt.id
        );
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_edit(
        &mut self,
        id: &str,
        title: Option<String>,
        body: Option<String>,
        category: Option<String>,
        add_tags: Option<String>,
        remove_tags: Option<String>,
        editor: bool,
    ) -> Result<()> {
        if body.is_some() && editor {
            return Err(PromptError::ApplicationError {
                message: "Cannot specify both --body and --editor options".to_string(),
            });
        }

        let mut prompt = self.store.resolve(id)?.clone();

        if let Some(new_title) = title {
            prompt.rename(new_title);
        }
        if let Some(new_body) = body {
            prompt.update_body(new_body);
        } else if editor {
            let edited = self.open_editor_with_content(&prompt.title, &prompt.body)?;
            prompt.update_body(edited);
        }
        if let Some(name) = category {
            prompt.set_category(parse_category(&name)?);
        }
        for tag in parse_tags(add_tags) {
            prompt.add_tag(&tag);
        }
        for tag in parse_tags(remove_tags) {
            prompt.remove_tag(&tag);
        }

        let prompt = self.store.update(prompt)?;
        self.report_save();
        self.events.emit(ActivityEvent::Updated { id: prompt.id });

        println!("Prompt {} updated successfully", prompt.id);
        Ok(())
    }

    // Helper function for reading content from file
    fn read_content_from_file(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(PromptError::ApplicationError {
                message: format!("Not a file: {}", path.display()),
            });
        }

        read_to_string(path).map_err(PromptError::Io)
    }

    // Helper function to open editor with existing content
    fn open_editor_with_content(&self, title: &str, existing_content: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        {
            let mut file = OpenOptions::new().write(true).open(&temp_path)?;
            writeln!(file, "<!-- Editing: {} -->", title)?;
            writeln!(
                file,
                "<!-- Lines that start with <!-- and end with --> are ignored. Save and exit when done. -->"
            )?;
            writeln!(file, "{}", existing_content)?;
        }

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor to edit prompt body. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(self.process_editor_content(&content))
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let args = split(editor_cmd).map_err(|e| PromptError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let Some((program, rest)) = args.split_first() else {
            return Err(PromptError::EditorError {
                message: "Empty editor command".to_string(),
            });
        };

        let status = Command::new(program)
            .args(rest)
            .arg(file_path)
            .status()
            .map_err(|e| PromptError::EditorError {
                message: format!("Failed to execute editor command: {}", e),
            })?;

        if !status.success() {
            return Err(PromptError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }

    fn process_editor_content(&self, content: &str) -> String {
        content
            .lines()
            .filter(|line| {
                !(line.trim_start().starts_with("<!--") && line.trim_end().ends_with("-->"))
            })
            .collect::<Vec<&str>>()
            .join("\n")
    }

    fn handle_delete(&mut self, id: &str, force: bool) -> Result<()> {
        let prompt = self.store.resolve(id)?.clone();

        if !force {
            println!("You are about to delete the following prompt:");
            println!("ID:       {}", prompt.id);
            println!("Title:    {}", prompt.title);
            println!("Category: {}", prompt.category);
            println!("Tags:     {}", prompt.tags.join(", "));

            println!("\nThis action cannot be undone!");
            print!("Are you sure you want to delete this prompt? [y/N]: ");
            stdout().flush()?;

            let mut input = String::new();
            stdin().read_line(&mut input)?;

            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        self.store.delete(&prompt.id)?;
        self.report_save();
        self.events.emit(ActivityEvent::Deleted { id: prompt.id });

        println!(
            "Prompt '{}' ({}) has been permanently deleted.",
            prompt.title, prompt.id
        );
        Ok(())
    }

    fn toggle_favorite(&mut self, id: &str) -> Result<()> {
        let id = self.store.resolve(id)?.id;
        let favorite = self.store.toggle_favorite(&id)?;
        self.report_save();
        self.events.emit(ActivityEvent::FavoriteToggled { id, favorite });

        println!(
            "Prompt {} {}",
            id,
            if favorite { "marked as favorite" } else { "removed from favorites" }
        );
        Ok(())
    }

    fn convert_idea(&mut self, id: &str) -> Result<()> {
        let idea = self.store.resolve(id)?;
        if idea.category != Category::Ideas {
            return Err(PromptError::ApplicationError {
                message: format!(
                    "Prompt {} is in category '{}', only '{}' can be converted",
                    idea.id,
                    idea.category,
                    Category::Ideas
                ),
            });
        }
        let idea_id = idea.id;

        let prompt = self.store.convert_idea(&idea_id)?;
        self.report_save();
        self.events.emit(ActivityEvent::Converted {
            idea: idea_id,
            prompt: prompt.id,
        });

        println!("Created prompt '{}' ({})", prompt.title, prompt.id);
        Ok(())
    }

    fn list_placeholders(&self, id: &str) -> Result<()> {
        let prompt = self.store.resolve(id)?;
        let names = extract_placeholders(&prompt.body);
        if names.is_empty() {
            println!("No placeholders in '{}'", prompt.title);
        }
        for name in names {
            println!("{}", name);
        }
        Ok(())
    }

    fn fill_placeholders(&mut self, id: &str, values: Vec<String>, no_input: bool) -> Result<()> {
        let prompt = self.store.resolve(id)?.clone();
        let mut provided = parse_assignments(&values)?;

        let names = extract_placeholders(&prompt.body);
        if !no_input {
            let missing: Vec<String> = names
                .iter()
                .filter(|n| !provided.contains_key(*n))
                .cloned()
                .collect();
            for name in missing {
                print!("{}: ", console::style(&name).cyan());
                stdout().flush()?;
                let mut input = String::new();
                stdin().read_line(&mut input)?;
                provided.insert(name, input.trim_end_matches(['\r', '\n']).to_string());
            }
        }

        println!("{}", replace_placeholders(&prompt.body, &provided));
        self.events.emit(ActivityEvent::PlaceholdersFilled {
            id: prompt.id,
            count: names.len(),
        });
        Ok(())
    }

    fn handle_config(&self, show: bool, reset: bool) -> Result<()> {
        if reset {
            let path = self.config_path.as_ref().ok_or_else(|| PromptError::ConfigError {
                message: "No configuration file location available".to_string(),
            })?;
            Config::default().save(path)?;
            println!("Configuration reset: {}", path.display());
        }

        if show || !reset {
            if let Some(path) = &self.config_path {
                println!("# {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&self.config)?);
        }
        Ok(())
    }

    /// Prints the failures of the last save, if any.
    fn report_save(&self) {
        let report = self.store.last_save_report();
        if report.is_clean() {
            if self.verbose {
                println!(
                    "Saved {} documents, removed {} orphaned files",
                    report.documents_written,
                    report.orphans_removed.len()
                );
            }
            return;
        }

        eprintln!(
            "{}",
            console::style("Warning: some files could not be saved").yellow()
        );
        for (path, reason) in &report.failures {
            eprintln!("  {}: {}", path.display(), reason);
        }
    }
}

/// Parses a category name, accepting any letter case.
fn parse_category(name: &str) -> Result<Category> {
    Category::parse(name)
        .or_else(|| {
            Category::ALL
                .into_iter()
                .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
        })
        .ok_or_else(|| PromptError::ApplicationError {
            message: format!(
                "Unknown category '{}'. Expected one of: {}",
                name,
                Category::ALL.map(|c| c.name()).join(", ")
            ),
        })
}

/// Parses `name=value` pairs given on the command line.
fn parse_assignments(values: &[String]) -> Result<HashMap<String, String>> {
    values
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(name, value)| (name.trim().to_string(), value.to_string()))
                .ok_or_else(|| PromptError::ApplicationError {
                    message: format!("Expected name=value, got '{}'", pair),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_category_is_case_insensitive() {
        assert_eq!(parse_category("coding").unwrap(), Category::Coding);
        assert_eq!(parse_category("random ideas").unwrap(), Category::Ideas);
        assert!(parse_category("Cooking").is_err());
    }

    #[test]
    fn parse_assignments_splits_on_first_equals() {
        let values = vec!["name=Sam".to_string(), "expr = a=b".to_string()];
        let parsed = parse_assignments(&values).unwrap();
        assert_eq!(parsed["name"], "Sam");
        assert_eq!(parsed["expr"], " a=b");

        assert!(parse_assignments(&["novalue".to_string()]).is_err());
    }
}
