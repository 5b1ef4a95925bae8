//! Markdown documents with a frontmatter header.
//!
//! A full document looks like this:
//!
//! ```text
//! ---
//! title: "Code Review Assistant"
//! id: 1b4e28ba-2fa1-11d2-883f-0016d3cca427
//! category: Coding
//! favorite: false
//! created: 2026-10-18T09:30:00Z
//! modified: 2026-10-18T09:30:00Z
//! tags: ["code-review", "development"]
//! ---
//! # Code Review Assistant
//!
//! **Category:** 💻 Coding
//! ...
//!
//! ---
//! <body>
//! ```
//!
//! The header sits between the first two `---` lines. The rendering after it
//! is for people reading the file and is ignored on decode; the body is
//! everything after the `---` line that closes the rendering.
use std::{fs, path::Path};

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, trace, warn};
use uuid::Uuid;

use crate::{dedup_tags, timestamp_now, Category, Prompt, PromptError, Result};

const DELIMITER: &str = "---";

/// Encodes the full document, rendering relative times against the current time.
pub fn encode_document(prompt: &Prompt) -> String {
    encode_document_at(prompt, Utc::now())
}

/// Encodes the full document, rendering relative times against `now`.
///
/// The output depends only on the prompt fields and `now`.
pub fn encode_document_at(prompt: &Prompt, now: DateTime<Utc>) -> String {
    let mut doc = String::with_capacity(prompt.body.len() + 512);

    doc.push_str(DELIMITER);
    doc.push('\n');
    doc.push_str(&format!("title: {}\n", quote(&prompt.title)));
    doc.push_str(&format!("id: {}\n", prompt.id));
    doc.push_str(&format!("category: {}\n", prompt.category.name()));
    doc.push_str(&format!("favorite: {}\n", prompt.is_favorite));
    doc.push_str(&format!("created: {}\n", format_timestamp(&prompt.created_at)));
    doc.push_str(&format!("modified: {}\n", format_timestamp(&prompt.modified_at)));
    let tags: Vec<String> = prompt.tags.iter().map(|t| quote(t)).collect();
    doc.push_str(&format!("tags: [{}]\n", tags.join(", ")));
    doc.push_str(DELIMITER);
    doc.push('\n');

    doc.push_str(&format!("# {}\n\n", single_line(&prompt.title)));
    doc.push_str(&format!(
        "**Category:** {} {}\n",
        prompt.category.icon(),
        prompt.category.name()
    ));
    doc.push_str(&format!(
        "**Created:** {}\n",
        format_relative(&prompt.created_at, &now)
    ));
    doc.push_str(&format!(
        "**Modified:** {}\n",
        format_relative(&prompt.modified_at, &now)
    ));
    if prompt.is_favorite {
        doc.push_str("**Favorite:** ⭐ Yes\n");
    } else {
        doc.push_str("**Favorite:** No\n");
    }
    if !prompt.tags.is_empty() {
        let chips: Vec<String> = prompt
            .tags
            .iter()
            .map(|t| format!("`#{}`", single_line(t)))
            .collect();
        doc.push_str(&format!("**Tags:** {}\n", chips.join(" ")));
    }
    doc.push('\n');

    doc.push_str(DELIMITER);
    doc.push('\n');
    doc.push_str(&prompt.body);
    doc.push('\n');

    doc
}

/// Encodes the title-and-body document written for people browsing the files.
pub fn encode_simplified(prompt: &Prompt) -> String {
    format!("# {}\n\n{}\n", single_line(&prompt.title), prompt.body)
}

/// Decodes a full document.
///
/// `title`, `id` and `category` must be present and valid. A missing or
/// unparsable timestamp falls back to the current time.
pub fn decode_document(text: &str) -> Result<Prompt> {
    let (header, body) = split_document(text)?;

    let mut title = None;
    let mut id = None;
    let mut category = None;
    let mut favorite = None;
    let mut created = None;
    let mut modified = None;
    let mut tags = None;

    for line in header.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let slot = match key.trim() {
            "title" => &mut title,
            "id" => &mut id,
            "category" => &mut category,
            "favorite" => &mut favorite,
            "created" => &mut created,
            "modified" => &mut modified,
            "tags" => &mut tags,
            other => {
                trace!("Ignoring unknown header key: {}", other);
                continue;
            }
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    let title = title
        .map(unquote)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| invalid("missing title"))?;

    let id = id.map(unquote).ok_or_else(|| invalid("missing id"))?;
    let id = Uuid::parse_str(&id).map_err(|e| invalid(&format!("invalid id '{}': {}", id, e)))?;

    let category = category
        .map(unquote)
        .ok_or_else(|| invalid("missing category"))?;
    let category = Category::parse(&category)
        .ok_or_else(|| invalid(&format!("unknown category '{}'", category)))?;

    let is_favorite = favorite.map(unquote).is_some_and(|f| f == "true");
    let tags = tags.map(parse_tag_list).unwrap_or_default();

    let created_at = parse_timestamp(created, "created", &id);
    let modified_at = parse_timestamp(modified, "modified", &id).max(created_at);

    Ok(Prompt {
        id,
        title,
        body: body.trim().to_string(),
        category,
        tags,
        created_at,
        modified_at,
        is_favorite,
    })
}

/// Returns only the body of a full document, without validating the header.
pub fn extract_body(text: &str) -> Result<String> {
    let (_, body) = split_document(text)?;
    Ok(body.trim().to_string())
}

/// Reads and decodes the document at `path`.
pub fn read_document(path: &Path) -> Result<Prompt> {
    debug!("Loading prompt document: {}", path.display());
    let text = fs::read_to_string(path)?;
    decode_document(&text).map_err(|e| {
        warn!("Failed to decode {}: {}", path.display(), e);
        e
    })
}

/// Reads the body of the document at `path`.
pub fn read_body(path: &Path) -> Result<String> {
    trace!("Reading body of {}", path.display());
    let text = fs::read_to_string(path)?;
    extract_body(&text)
}

/// Splits a document into its header block and the raw text after the body delimiter.
fn split_document(text: &str) -> Result<(&str, &str)> {
    let text = text.trim_start_matches('\u{feff}').trim_start();
    let mut delimiters = delimiter_offsets(text);

    let (open_start, open_end) = delimiters
        .next()
        .ok_or_else(|| invalid("missing header start marker"))?;
    if open_start != 0 {
        return Err(invalid("document does not start with a header"));
    }
    let (close_start, _) = delimiters
        .next()
        .ok_or_else(|| invalid("missing header end marker"))?;
    let (_, body_start) = delimiters
        .next()
        .ok_or_else(|| invalid("missing body delimiter"))?;

    Ok((&text[open_end..close_start], &text[body_start..]))
}

/// Byte spans of every `---` line, each span covering the line and its newline.
fn delimiter_offsets(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    text.split_inclusive('\n')
        .scan(0usize, |offset, line| {
            let start = *offset;
            *offset += line.len();
            Some((start, *offset, line))
        })
        .filter(|(_, _, line)| line.trim_end() == DELIMITER)
        .map(|(start, end, _)| (start, end))
}

fn invalid(message: &str) -> PromptError {
    PromptError::InvalidFormat {
        message: message.to_string(),
    }
}

fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        if let Ok(parsed) = serde_json::from_str::<String>(value) {
            return parsed;
        }
        return value[1..value.len() - 1].to_string();
    }
    value.to_string()
}

fn parse_tag_list(value: &str) -> Vec<String> {
    if let Ok(tags) = serde_json::from_str::<Vec<String>>(value) {
        return dedup_tags(tags);
    }

    let inner = value.trim().trim_start_matches('[').trim_end_matches(']');
    let tags = inner
        .split(',')
        .map(|t| t.trim().trim_matches('"').trim().to_string())
        .collect();
    dedup_tags(tags)
}

fn parse_timestamp(value: Option<&str>, field: &str, id: &Uuid) -> DateTime<Utc> {
    match value.map(unquote) {
        Some(raw) => match DateTime::parse_from_rfc3339(&raw) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(e) => {
                warn!(
                    "Unparsable {} timestamp '{}' in prompt {}, using now: {}",
                    field, raw, id, e
                );
                timestamp_now()
            }
        },
        None => {
            warn!("Missing {} timestamp in prompt {}, using now", field, id);
            timestamp_now()
        }
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Formats `timestamp` relative to `now`, e.g. "3 days ago".
pub fn format_relative(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(*timestamp).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let (amount, unit) = match seconds {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };

    format!("{} {}{} ago", amount, unit, if amount == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample() -> Prompt {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 8, 15, 0).unwrap();
        Prompt {
            id: Uuid::parse_str("1b4e28ba-2fa1-11d2-883f-0016d3cca427").unwrap(),
            title: "Review \"this\": code".to_string(),
            body: "Check {{language}} code:\n\n---\n{{code}}".to_string(),
            category: Category::Coding,
            tags: vec!["code-review".to_string(), "dev, ops".to_string()],
            created_at: created,
            modified_at: created + Duration::hours(5),
            is_favorite: true,
        }
    }

    #[test]
    fn round_trip_reproduces_every_field() {
        let prompt = sample();
        let decoded = decode_document(&encode_document(&prompt)).unwrap();
        assert_eq!(decoded, prompt);
    }

    #[test]
    fn round_trip_without_tags_or_favorite() {
        let mut prompt = sample();
        prompt.tags.clear();
        prompt.is_favorite = false;
        prompt.category = Category::Ideas;

        let decoded = decode_document(&encode_document(&prompt)).unwrap();
        assert_eq!(decoded, prompt);
    }

    #[test]
    fn encoding_is_deterministic_for_a_fixed_clock() {
        let prompt = sample();
        let now = prompt.modified_at + Duration::days(3);
        assert_eq!(encode_document_at(&prompt, now), encode_document_at(&prompt, now));
    }

    #[test]
    fn encoded_header_matches_wire_format() {
        let prompt = sample();
        let doc = encode_document_at(&prompt, prompt.modified_at);
        let expected_header = "---\n\
            title: \"Review \\\"this\\\": code\"\n\
            id: 1b4e28ba-2fa1-11d2-883f-0016d3cca427\n\
            category: Coding\n\
            favorite: true\n\
            created: 2026-03-01T08:15:00Z\n\
            modified: 2026-03-01T13:15:00Z\n\
            tags: [\"code-review\", \"dev, ops\"]\n\
            ---\n";
        assert!(doc.starts_with(expected_header), "got:\n{}", doc);
        assert!(doc.contains("**Category:** 💻 Coding\n"));
        assert!(doc.contains("**Modified:** just now\n"));
        assert!(doc.contains("**Created:** 5 hours ago\n"));
        assert!(doc.ends_with("---\nCheck {{language}} code:\n\n---\n{{code}}\n"));
    }

    #[test]
    fn simplified_document_has_no_header() {
        let prompt = sample();
        assert_eq!(
            encode_simplified(&prompt),
            "# Review \"this\": code\n\nCheck {{language}} code:\n\n---\n{{code}}\n"
        );
    }

    #[test]
    fn decode_tolerates_unquoted_values_and_loose_tags() {
        let doc = "---\n\
            title: Plain title\n\
            id: \"1b4e28ba-2fa1-11d2-883f-0016d3cca427\"\n\
            category: \"Random Ideas\"\n\
            created: 2026-01-01T00:00:00Z\n\
            modified: 2026-01-02T00:00:00+02:00\n\
            tags: [ \"a\",b , \"a\" ]\n\
            ---\n\
            anything\n\
            ---\n\n  body text  \n\n";

        let prompt = decode_document(doc).unwrap();
        assert_eq!(prompt.title, "Plain title");
        assert_eq!(prompt.category, Category::Ideas);
        assert!(!prompt.is_favorite);
        assert_eq!(prompt.tags, vec!["a", "b"]);
        assert_eq!(prompt.body, "body text");
        assert_eq!(
            prompt.modified_at,
            Utc.with_ymd_and_hms(2026, 1, 1, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn decode_rejects_unknown_category() {
        let doc = encode_document(&sample()).replace("category: Coding", "category: Cooking");
        assert!(matches!(
            decode_document(&doc),
            Err(PromptError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn decode_requires_title_id_and_category() {
        let doc = encode_document(&sample());
        for key in ["title:", "id:", "category:"] {
            let broken: String = doc
                .lines()
                .filter(|line| !line.starts_with(key))
                .map(|line| format!("{}\n", line))
                .collect();
            assert!(decode_document(&broken).is_err(), "decoded without {}", key);
        }

        let bad_id = doc.replace("1b4e28ba-2fa1-11d2-883f-0016d3cca427", "not-a-uuid");
        assert!(decode_document(&bad_id).is_err());
    }

    #[test]
    fn decode_falls_back_to_now_for_bad_timestamps() {
        let before = timestamp_now();
        let doc = encode_document(&sample())
            .replace("created: 2026-03-01T08:15:00Z", "created: yesterday")
            .replace("modified: 2026-03-01T13:15:00Z\n", "");

        let prompt = decode_document(&doc).unwrap();
        assert!(prompt.created_at >= before);
        assert!(prompt.modified_at >= prompt.created_at);
    }

    #[test]
    fn decode_rejects_documents_without_delimiters() {
        assert!(decode_document("# Just markdown\n\nNo header").is_err());
        assert!(decode_document("---\ntitle: x\n").is_err());
        assert!(extract_body("---\ntitle: x\n---\nrendering only\n").is_err());
    }

    #[test]
    fn extract_body_ignores_header_contents() {
        let doc = "---\ncategory: Nonsense\n---\n# heading\n---\n\nthe body\n---\nmore\n";
        assert_eq!(extract_body(doc).unwrap(), "the body\n---\nmore");
    }

    #[test]
    fn newline_in_title_cannot_forge_a_delimiter() {
        let mut prompt = sample();
        prompt.title = "first\n---\nsecond".to_string();
        let decoded = decode_document(&encode_document(&prompt)).unwrap();
        assert_eq!(decoded, prompt);
    }

    #[test]
    fn relative_times() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(format_relative(&now, &now), "just now");
        assert_eq!(format_relative(&(now - Duration::minutes(1)), &now), "1 minute ago");
        assert_eq!(format_relative(&(now - Duration::hours(3)), &now), "3 hours ago");
        assert_eq!(format_relative(&(now - Duration::days(2)), &now), "2 days ago");
        assert_eq!(format_relative(&(now - Duration::days(65)), &now), "2 months ago");
        assert_eq!(format_relative(&(now - Duration::days(800)), &now), "2 years ago");
        assert_eq!(format_relative(&(now + Duration::days(1)), &now), "just now");
    }
}
