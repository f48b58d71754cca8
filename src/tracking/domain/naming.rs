//! Naming rules for detail surfaces and their categories.

use super::{ItemId, ItemKind};

/// Longest slug kept in a detail surface name.
pub const MAX_SLUG_LEN: usize = 80;

const UNTITLED: &str = "untitled";

/// Lowercases `title` and collapses every non-alphanumeric run into `-`.
///
/// The result is trimmed of leading and trailing dashes and capped at
/// [`MAX_SLUG_LEN`] characters. An empty result becomes `untitled`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    let capped: String = slug.chars().take(MAX_SLUG_LEN).collect();
    let trimmed = capped.trim_end_matches('-');
    if trimmed.is_empty() {
        UNTITLED.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Returns the detail surface name, `<noun>-<slug>`.
#[must_use]
pub fn detail_surface_name(kind: ItemKind, title: &str) -> String {
    format!("{}-{}", kind.descriptor().noun, slugify(title))
}

/// Returns the suffix adapters append when a surface name collides.
#[must_use]
pub fn surface_suffix_hint(id: ItemId) -> String {
    id.short_suffix()
}

/// Returns the category a detail surface is filed under.
///
/// Repository categories use the short repository name, so `acme/widgets`
/// files under `Bugs: widgets`.
#[must_use]
pub fn category_name(kind: ItemKind, category: Option<&str>) -> String {
    let plural = kind.descriptor().plural_title;
    let short = category
        .map(|repo| repo.rsplit('/').next().unwrap_or(repo).trim())
        .filter(|repo| !repo.is_empty());
    match short {
        Some(repo) => format!("{plural}: {repo}"),
        None => format!("{plural}: General"),
    }
}
