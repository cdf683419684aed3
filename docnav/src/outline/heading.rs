//! Heading extraction

use super::blocks::{plain_text, Document};
use super::slugger::Slugger;
use serde::Serialize;

/// A section heading with its unique id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Flattened plain text of the heading
    pub title: String,
    /// Unique slug within the document
    pub id: String,
    /// Heading depth (1..=6)
    pub depth: u8,
}

impl Heading {
    /// Create a new heading
    pub fn new(title: impl Into<String>, id: impl Into<String>, depth: u8) -> Self {
        Self {
            title: title.into(),
            id: id.into(),
            depth,
        }
    }
}

/// Extract every heading of `document` in document order
///
/// A fresh [`Slugger`] is used per call, so ids from different documents
/// never influence each other.
pub fn extract_headings(document: &Document) -> Vec<Heading> {
    let mut slugger = Slugger::new();
    extract_headings_with(document, &mut slugger)
}

/// Extract headings using a caller-provided slugger
///
/// Useful when several fragments share one id namespace.
pub fn extract_headings_with(document: &Document, slugger: &mut Slugger) -> Vec<Heading> {
    document
        .headings()
        .map(|(depth, content)| {
            let title = plain_text(content);
            let id = slugger.slug(&title);
            log::debug!("Heading h{} '{}' -> #{}", depth, title, id);
            Heading { title, id, depth }
        })
        .collect()
}
