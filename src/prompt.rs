//! Core data structures for the promptex application.
//!
//! A [`Prompt`] is the persisted unit. Every mutation that changes a stored
//! value moves `modified_at` forward; `created_at` never changes after
//! construction.
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{dedup_tags, timestamp_now};

/// Tag attached to prompts produced by [`convert_to_prompt`].
pub const CONVERTED_TAG: &str = "converted-from-idea";

/// Tag attached to every quick capture.
pub const QUICK_ADD_TAG: &str = "quick-add";

/// Maximum number of characters taken from captured text for the title.
const CAPTURE_TITLE_LEN: usize = 50;

/// The closed set of prompt categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "General")]
    General,
    #[serde(rename = "Coding")]
    Coding,
    #[serde(rename = "Writing")]
    Writing,
    #[serde(rename = "Analysis")]
    Analysis,
    #[serde(rename = "Creative")]
    Creative,
    #[serde(rename = "Random Ideas")]
    Ideas,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::General,
        Category::Coding,
        Category::Writing,
        Category::Analysis,
        Category::Creative,
        Category::Ideas,
    ];

    /// The name written to documents and to the metadata index.
    pub fn name(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Coding => "Coding",
            Category::Writing => "Writing",
            Category::Analysis => "Analysis",
            Category::Creative => "Creative",
            Category::Ideas => "Random Ideas",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::General => "📄",
            Category::Coding => "💻",
            Category::Writing => "✏️",
            Category::Analysis => "📊",
            Category::Creative => "🎨",
            Category::Ideas => "💡",
        }
    }

    /// Parses a category name. Only the exact names are accepted.
    pub fn parse(name: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents a single prompt (or idea) in our system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    /// Unique identifier, fixed for the lifetime of the prompt
    pub id: Uuid,
    /// Display title, never empty
    pub title: String,
    /// Free text, may contain `{{placeholder}}` tokens
    pub body: String,
    pub category: Category,
    /// Set-like: no duplicates, insertion order kept for display
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub is_favorite: bool,
}

/// What a quick capture should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Prompt,
    Idea,
}

impl Prompt {
    /// Creates a new prompt with a fresh id and both timestamps set to now.
    pub fn new(title: String, body: String, category: Category, tags: Vec<String>) -> Self {
        let now = timestamp_now();
        Prompt {
            id: Uuid::new_v4(),
            title,
            body,
            category,
            tags: dedup_tags(tags),
            created_at: now,
            modified_at: now,
            is_favorite: false,
        }
    }

    /// Builds a prompt from free captured text.
    ///
    /// The title is the first line of the text cut to 50 characters. Returns
    /// `None` when the text is blank.
    pub fn quick_capture(text: &str, kind: CaptureKind) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let first_line = text.lines().next().unwrap_or(text);
        let title: String = first_line.chars().take(CAPTURE_TITLE_LEN).collect();

        let (category, tags) = match kind {
            CaptureKind::Prompt => (Category::General, vec![QUICK_ADD_TAG.to_string()]),
            CaptureKind::Idea => (
                Category::Ideas,
                vec![QUICK_ADD_TAG.to_string(), "idea".to_string()],
            ),
        };

        Some(Prompt::new(title, text.to_string(), category, tags))
    }

    fn touch(&mut self) {
        self.modified_at = timestamp_now().max(self.created_at);
    }

    pub fn update_body(&mut self, body: String) {
        if body != self.body {
            self.body = body;
            self.touch();
        }
    }

    pub fn rename(&mut self, title: String) {
        if title != self.title {
            self.title = title;
            self.touch();
        }
    }

    pub fn set_category(&mut self, category: Category) {
        if category != self.category {
            self.category = category;
            self.touch();
        }
    }

    pub fn set_favorite(&mut self, favorite: bool) {
        if favorite != self.is_favorite {
            self.is_favorite = favorite;
            self.touch();
        }
    }

    pub fn toggle_favorite(&mut self) {
        self.set_favorite(!self.is_favorite);
    }

    /// Adds a tag unless it is already present.
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
            self.touch();
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        if self.tags.len() != before {
            self.touch();
        }
    }

    /// Whether the stored values (everything but the timestamps) differ.
    pub fn content_differs(&self, other: &Prompt) -> bool {
        self.title != other.title
            || self.body != other.body
            || self.category != other.category
            || self.tags != other.tags
            || self.is_favorite != other.is_favorite
    }
}

/// Wraps an idea in the instructional template and returns it as a new,
/// unsaved prompt.
pub fn convert_to_prompt(idea: &Prompt) -> Prompt {
    let body = format!(
        "Please help me with the following idea/task:\n\n{}\n\nCould you provide detailed guidance, suggestions, or implementation steps?",
        idea.body
    );

    let mut tags = idea.tags.clone();
    tags.push(CONVERTED_TAG.to_string());

    Prompt::new(format!("Prompt: {}", idea.title), body, Category::General, tags)
}

/// The example prompts written when no data exists anywhere.
pub fn sample_prompts() -> Vec<Prompt> {
    vec![
        Prompt::new(
            "Code Review Assistant".to_string(),
            "Please review this code and provide suggestions for improvement, focusing on readability, performance, and best practices:\n\n{{code}}".to_string(),
            Category::Coding,
            vec!["code-review".to_string(), "development".to_string()],
        ),
        Prompt::new(
            "Creative Writing Helper".to_string(),
            "Help me write a creative story about {{topic}}. Please include vivid descriptions, engaging dialogue, and a compelling plot structure.".to_string(),
            Category::Creative,
            vec!["writing".to_string(), "storytelling".to_string()],
        ),
        Prompt::new(
            "Random Idea".to_string(),
            "What if we could create an app that combines voice notes with AI to automatically organize thoughts?".to_string(),
            Category::Ideas,
            vec!["brainstorming".to_string(), "app-idea".to_string()],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_prompt_dedups_tags_and_starts_unmodified() {
        let prompt = Prompt::new(
            "Title".to_string(),
            "Body".to_string(),
            Category::Writing,
            vec!["a".to_string(), "b".to_string(), "a".to_string()],
        );

        assert_eq!(prompt.tags, vec!["a", "b"]);
        assert_eq!(prompt.created_at, prompt.modified_at);
        assert!(!prompt.is_favorite);
    }

    #[test]
    fn category_parse_accepts_only_exact_names() {
        assert_eq!(Category::parse("Random Ideas"), Some(Category::Ideas));
        assert_eq!(Category::parse("Coding"), Some(Category::Coding));
        assert_eq!(Category::parse("coding"), None);
        assert_eq!(Category::parse("Ideas"), None);
    }

    #[test]
    fn unchanged_mutations_keep_modified_at() {
        let mut prompt = Prompt::new("T".into(), "B".into(), Category::General, vec!["x".into()]);
        let earlier = prompt.created_at - Duration::days(1);
        prompt.created_at = earlier;
        prompt.modified_at = earlier;

        prompt.update_body("B".into());
        prompt.add_tag("x");
        prompt.remove_tag("missing");
        prompt.set_category(Category::General);
        assert_eq!(prompt.modified_at, earlier);

        prompt.add_tag("y");
        assert!(prompt.modified_at > earlier);
        assert_eq!(prompt.tags, vec!["x", "y"]);
    }

    #[test]
    fn toggle_favorite_moves_modified_forward() {
        let mut prompt = Prompt::new("T".into(), "B".into(), Category::General, vec![]);
        prompt.created_at -= Duration::hours(2);
        prompt.modified_at = prompt.created_at;

        prompt.toggle_favorite();
        assert!(prompt.is_favorite);
        assert!(prompt.modified_at > prompt.created_at);
    }

    #[test]
    fn quick_capture_uses_first_line_for_title() {
        let long_line = "x".repeat(80);
        let text = format!("  {}\nsecond line  ", long_line);

        let prompt = Prompt::quick_capture(&text, CaptureKind::Prompt).unwrap();
        assert_eq!(prompt.title.chars().count(), 50);
        assert_eq!(prompt.body, format!("{}\nsecond line", long_line));
        assert_eq!(prompt.category, Category::General);
        assert_eq!(prompt.tags, vec![QUICK_ADD_TAG]);

        let idea = Prompt::quick_capture("an idea", CaptureKind::Idea).unwrap();
        assert_eq!(idea.category, Category::Ideas);
        assert_eq!(idea.tags, vec![QUICK_ADD_TAG, "idea"]);

        assert!(Prompt::quick_capture("   \n ", CaptureKind::Idea).is_none());
    }

    #[test]
    fn convert_to_prompt_wraps_body_and_tags_it() {
        let idea = Prompt::new(
            "Voice notes".into(),
            "Organize thoughts automatically".into(),
            Category::Ideas,
            vec!["idea".into(), CONVERTED_TAG.into()],
        );

        let converted = convert_to_prompt(&idea);
        assert_ne!(converted.id, idea.id);
        assert_eq!(converted.title, "Prompt: Voice notes");
        assert_eq!(converted.category, Category::General);
        assert_eq!(converted.tags, vec!["idea", CONVERTED_TAG]);
        assert!(converted
            .body
            .starts_with("Please help me with the following idea/task:\n\nOrganize thoughts automatically\n\n"));
    }
}
