//! Heading slug generation
//!
//! Slugs are lowercase ASCII with diacritics folded away and every run of
//! whitespace or punctuation collapsed to a single hyphen. Duplicate slugs
//! within one document get `-1`, `-2`, ... suffixes.

use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Convert a heading title into its base (unsuffixed) slug
///
/// Returns an empty string when the title has no ASCII alphanumeric content.
pub fn base_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Stateful unique-id generator for the headings of one document
///
/// Create a fresh `Slugger` per document; ids are only unique within the
/// lifetime of one instance.
#[derive(Debug, Default, Clone)]
pub struct Slugger {
    /// Base slug -> number of times it has been suffixed so far
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    /// Create a slugger with no recorded slugs
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a unique slug for `title`
    ///
    /// The first occurrence of a base slug is returned bare; later ones get
    /// the next free numeric suffix. Generated slugs are recorded too, so a
    /// later title that literally slugs to `foo-1` will not collide with a
    /// suffixed `foo`.
    pub fn slug(&mut self, title: &str) -> String {
        let base = base_slug(title);
        let mut candidate = base.clone();

        while self.occurrences.contains_key(&candidate) {
            let count = self.occurrences.entry(base.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{}-{}", base, count);
        }

        self.occurrences.insert(candidate.clone(), 0);
        candidate
    }

    /// Forget every slug seen so far
    pub fn reset(&mut self) {
        self.occurrences.clear();
    }
}
