//! Tags and the rules for turning free-text tag entry into slug-safe tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PostDetail;

/// Maximum number of tags a post can carry.
pub const MAX_TAGS: usize = 5;

/// Tag entity. `name` and `slug` are both the normalized token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl Tag {
    /// Build a tag from an already-normalized token.
    pub fn from_normalized(token: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: token.clone(),
            slug: token,
        }
    }
}

/// A tag with its published posts, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagWithPosts {
    pub tag: Tag,
    pub posts: Vec<PostDetail>,
}

/// Canonicalize a free-text tag.
///
/// Steps, in order: lowercase, trim, whitespace runs to a single `-`, drop
/// anything outside `[A-Za-z0-9_-]`, collapse repeated `-`, strip leading and
/// trailing `-`. Applying it to its own output returns the same string.
pub fn normalize_tag(input: &str) -> String {
    let lowered = input.to_lowercase();

    let mut hyphenated = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for c in lowered.trim().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                hyphenated.push('-');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            hyphenated.push(c);
        }
    }

    let mut collapsed = String::with_capacity(hyphenated.len());
    for c in hyphenated
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
    {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed.trim_matches('-').to_string()
}

/// Add a free-text tag to `tags`, returning the new list.
///
/// The input is ignored when it normalizes to nothing, is already present
/// (exact match) or the list is full.
pub fn add_tag(tags: &[String], input: &str) -> Vec<String> {
    let normalized = normalize_tag(input);
    let mut next = tags.to_vec();

    if !normalized.is_empty() && !tags.contains(&normalized) && tags.len() < MAX_TAGS {
        next.push(normalized);
    }

    next
}

/// Remove the tag at `index`. Out-of-range indexes leave the list unchanged.
pub fn remove_tag(tags: &[String], index: usize) -> Vec<String> {
    tags.iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, t)| t.clone())
        .collect()
}

/// Fold a batch of raw inputs through [`add_tag`], as a post submission does.
pub fn normalize_tags<I, S>(inputs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    inputs
        .into_iter()
        .fold(Vec::new(), |tags, input| add_tag(&tags, input.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_collapses_whitespace_and_punctuation() {
        assert_eq!(normalize_tag("  Web   Dev!! "), "web-dev");
        assert_eq!(normalize_tag("C++"), "c");
        assert_eq!(normalize_tag("--Rust--Lang--"), "rust-lang");
        assert_eq!(normalize_tag("node_js"), "node_js");
        assert_eq!(normalize_tag("a ! b"), "a-b");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        assert_eq!(normalize_tag("typescript"), "typescript");
        for raw in ["  Web   Dev!! ", "Machine Learning", "C#", "ünïcode tag"] {
            let once = normalize_tag(raw);
            assert_eq!(normalize_tag(&once), once);
        }
    }

    #[test]
    fn test_normalize_strips_non_ascii_word_chars() {
        assert_eq!(normalize_tag("café"), "caf");
        assert_eq!(normalize_tag("日本語"), "");
    }

    #[test]
    fn test_add_tag_appends_normalized() {
        let result = add_tag(&tags(&["rust"]), "  Web   Dev!! ");
        assert_eq!(result, tags(&["rust", "web-dev"]));
    }

    #[test]
    fn test_add_tag_ignores_blank_input() {
        let existing = tags(&["rust"]);
        assert_eq!(add_tag(&existing, "   "), existing);
        assert_eq!(add_tag(&existing, "!!!"), existing);
    }

    #[test]
    fn test_add_tag_ignores_duplicates() {
        let existing = tags(&["web-dev"]);
        assert_eq!(add_tag(&existing, "Web Dev"), existing);
    }

    #[test]
    fn test_duplicate_check_is_case_sensitive_on_existing_list() {
        // Existing entries are compared verbatim; normalization only applies to input.
        let existing = tags(&["Rust"]);
        assert_eq!(add_tag(&existing, "rust"), tags(&["Rust", "rust"]));
    }

    #[test]
    fn test_add_tag_caps_at_five() {
        let full = tags(&["a", "b", "c", "d", "e"]);
        assert_eq!(add_tag(&full, "f"), full);
    }

    #[test]
    fn test_remove_tag() {
        let existing = tags(&["a", "b", "c"]);
        assert_eq!(remove_tag(&existing, 1), tags(&["a", "c"]));
        assert_eq!(remove_tag(&existing, 9), existing);
    }

    #[test]
    fn test_normalize_tags_batch() {
        let result = normalize_tags(["Rust", "rust", " ", "Web Dev", "a", "b", "c", "d"]);
        assert_eq!(result, tags(&["rust", "web-dev", "a", "b", "c"]));
    }
}
