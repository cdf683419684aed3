//! Document outline: headings, slugs and the nested section tree
//!
//! The outline stage turns a parsed document into the data a table of
//! contents is drawn from:
//! 1. **Parsing**: markdown -> ordered [`Block`] list
//! 2. **Extraction**: heading blocks -> [`Heading`] list with unique ids
//! 3. **Nesting**: heading list -> [`Section`] forest plus [`AncestorMap`]

mod blocks;
mod heading;
mod parser;
mod slugger;
mod tree;

// Re-export public types
pub use blocks::{plain_text, Block, Document, Inline};
pub use heading::{extract_headings, extract_headings_with, Heading};
pub use parser::{parse_document, MarkdownParser};
pub use slugger::{base_slug, Slugger};
pub use tree::{build_outline, build_section_tree, walk, AncestorMap, Section, SectionIter};

/// The complete outline of one document
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Outline {
    /// Headings in document order
    pub headings: Vec<Heading>,
    /// Nested sections
    pub sections: Vec<Section>,
    /// Ancestor chain of every section id
    #[serde(skip)]
    pub ancestors: AncestorMap,
}

impl Outline {
    /// Build the outline of a parsed document
    pub fn from_document(document: &Document) -> Self {
        let headings = extract_headings(document);
        let (sections, ancestors) = build_outline(&headings);
        Self {
            headings,
            sections,
            ancestors,
        }
    }

    /// Parse markdown and build its outline
    pub fn from_markdown(markdown: &str) -> Self {
        Self::from_document(&parse_document(markdown))
    }

    /// Whether the document has no headings
    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }
}
