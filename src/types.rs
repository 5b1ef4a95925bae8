//! Shared result and report types plus the command definitions of the CLI.
use std::path::PathBuf;

use clap::Subcommand;

use crate::PromptError;

/// A specialized Result type for promptex operations.
pub type Result<T> = std::result::Result<T, PromptError>;

/// Which strategy produced the prompts at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Read from the metadata index
    Index,
    /// Decoded from the documents after the index could not be read
    Scan,
    /// No data was found and the sample prompts were written
    Seed,
}

/// Outcome of one save pass. File failures do not stop the pass; they are
/// collected here.
#[derive(Debug, Clone, Default)]
pub struct SaveReport {
    /// Full documents written to the prompts directory
    pub documents_written: usize,
    /// Simplified copies written to the resources directory
    pub simplified_written: usize,
    pub index_written: bool,
    /// Stale documents deleted from the prompts directory
    pub orphans_removed: Vec<PathBuf>,
    /// Every file that could not be written or removed, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

impl SaveReport {
    pub fn is_clean(&self) -> bool {
        self.index_written && self.failures.is_empty()
    }
}

/// Available subcommands for the promptex application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List prompts, most recently modified first
    List {
        /// Case-insensitive text matched against title, body and tags
        #[clap(short, long)]
        search: Option<String>,

        /// Only show prompts of this category
        #[clap(short, long)]
        category: Option<String>,

        /// Only show favorites
        #[clap(short, long)]
        favorites: bool,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show one prompt
    Show {
        /// ID (or unique ID prefix) of the prompt
        id: String,

        /// Print the full frontmatter document
        #[clap(short, long)]
        document: bool,
    },

    /// Create a new prompt
    Add {
        /// Title of the prompt
        #[clap(short = 'T', long)]
        title: String,

        /// Body of the prompt, may contain {{placeholders}}
        #[clap(short, long)]
        body: Option<String>,

        /// Path to a file containing the body
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Category name (General, Coding, Writing, Analysis, Creative, "Random Ideas")
        #[clap(short, long, default_value = "General")]
        category: String,

        /// Tags (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,
    },

    /// Quickly capture text as a prompt or an idea
    Capture {
        /// The captured text; the first line becomes the title
        text: String,

        /// Save as an idea instead of a prompt
        #[clap(short, long)]
        idea: bool,
    },

    /// Edit an existing prompt
    Edit {
        /// ID (or unique ID prefix) of the prompt
        id: String,

        /// New title
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New body
        #[clap(short, long)]
        body: Option<String>,

        /// New category
        #[clap(short, long)]
        category: Option<String>,

        /// Tags to add (comma-separated)
        #[clap(short, long)]
        add_tags: Option<String>,

        /// Tags to remove (comma-separated)
        #[clap(short, long)]
        remove_tags: Option<String>,

        /// Edit the body in the configured editor
        #[clap(short, long)]
        editor: bool,
    },

    /// Delete a prompt
    Delete {
        /// ID (or unique ID prefix) of the prompt
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Toggle the favorite flag of a prompt
    Favorite {
        /// ID (or unique ID prefix) of the prompt
        id: String,
    },

    /// Turn an idea into a new prompt
    Convert {
        /// ID (or unique ID prefix) of the idea
        id: String,
    },

    /// List the placeholders of a prompt in order of appearance
    Placeholders {
        /// ID (or unique ID prefix) of the prompt
        id: String,
    },

    /// Print a prompt body with its placeholders filled in
    Fill {
        /// ID (or unique ID prefix) of the prompt
        id: String,

        /// Placeholder values as name=value; missing ones are asked for
        #[clap(short = 's', long = "set")]
        values: Vec<String>,

        /// Do not ask for missing values, substitute empty strings
        #[clap(short, long)]
        no_input: bool,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
