//! View filter over the prompt list.
//!
//! Setters report whether they changed anything so the caller decides when to
//! refresh what it displays.
use crate::{Category, Prompt};

/// A change made through one of the [`PromptFilter`] setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    SearchText(String),
    Category(Option<Category>),
    FavoritesOnly(bool),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptFilter {
    search_text: String,
    category: Option<Category>,
    favorites_only: bool,
}

impl PromptFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn favorites_only(&self) -> bool {
        self.favorites_only
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> Option<FilterChange> {
        let text = text.into();
        if text == self.search_text {
            return None;
        }
        self.search_text = text.clone();
        Some(FilterChange::SearchText(text))
    }

    pub fn set_category(&mut self, category: Option<Category>) -> Option<FilterChange> {
        if category == self.category {
            return None;
        }
        self.category = category;
        Some(FilterChange::Category(category))
    }

    pub fn set_favorites_only(&mut self, favorites_only: bool) -> Option<FilterChange> {
        if favorites_only == self.favorites_only {
            return None;
        }
        self.favorites_only = favorites_only;
        Some(FilterChange::FavoritesOnly(favorites_only))
    }

    pub fn matches(&self, prompt: &Prompt) -> bool {
        if self.favorites_only && !prompt.is_favorite {
            return false;
        }
        if self.category.is_some_and(|c| c != prompt.category) {
            return false;
        }
        if self.search_text.is_empty() {
            return true;
        }

        let needle = self.search_text.to_lowercase();
        prompt.title.to_lowercase().contains(&needle)
            || prompt.body.to_lowercase().contains(&needle)
            || prompt.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    /// Matching prompts, most recently modified first.
    pub fn apply(&self, prompts: &[Prompt]) -> Vec<Prompt> {
        let mut filtered: Vec<Prompt> = prompts.iter().filter(|p| self.matches(p)).cloned().collect();
        filtered.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn prompts() -> Vec<Prompt> {
        let mut code = Prompt::new("Code Review".into(), "Review {{code}}".into(), Category::Coding, vec!["dev".into()]);
        let mut story = Prompt::new("Story".into(), "Write a tale".into(), Category::Creative, vec!["Fiction".into()]);
        story.is_favorite = true;
        code.modified_at += Duration::minutes(5);
        story.modified_at += Duration::minutes(10);
        vec![code, story]
    }

    #[test]
    fn setters_signal_only_real_changes() {
        let mut filter = PromptFilter::new();
        assert_eq!(filter.set_search_text("abc"), Some(FilterChange::SearchText("abc".into())));
        assert_eq!(filter.set_search_text("abc"), None);
        assert_eq!(filter.set_category(Some(Category::Coding)), Some(FilterChange::Category(Some(Category::Coding))));
        assert_eq!(filter.set_category(Some(Category::Coding)), None);
        assert_eq!(filter.set_favorites_only(false), None);
        assert_eq!(filter.set_favorites_only(true), Some(FilterChange::FavoritesOnly(true)));
    }

    #[test]
    fn empty_filter_sorts_by_modified_desc() {
        let titles: Vec<String> = PromptFilter::new().apply(&prompts()).into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["Story", "Code Review"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut filter = PromptFilter::new();
        filter.set_search_text("FICTION");
        let found = filter.apply(&prompts());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Story");

        filter.set_search_text("{{code}}");
        assert_eq!(filter.apply(&prompts())[0].title, "Code Review");
    }

    #[test]
    fn favorites_and_category_combine() {
        let mut filter = PromptFilter::new();
        filter.set_favorites_only(true);
        filter.set_category(Some(Category::Coding));
        assert!(filter.apply(&prompts()).is_empty());

        filter.set_category(Some(Category::Creative));
        assert_eq!(filter.apply(&prompts()).len(), 1);
    }
}
