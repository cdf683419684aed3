//! Block-level and inline document elements
//!
//! This is the parsed-document shape the outline stage consumes: an ordered
//! list of blocks, where headings carry a depth and an inline tree.

/// Inline content of a heading or paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Plain text
    Text(String),

    /// Inline code span (its literal value counts as text)
    Code(String),

    /// Emphasised content
    Emphasis(Vec<Inline>),

    /// Strong content
    Strong(Vec<Inline>),

    /// Struck-through content
    Strikethrough(Vec<Inline>),

    /// A hyperlink wrapping inline content
    Link {
        /// Link destination
        url: String,
        /// Link text
        children: Vec<Inline>,
    },

    /// An image; contributes no text to a heading title
    Image {
        /// Image source
        url: String,
        /// Alternative text
        alt: String,
    },

    /// Raw inline HTML; contributes no text
    Html(String),

    /// Soft (`true`) or hard (`false`) line break
    Break {
        /// Whether the break was a soft break in the source
        soft: bool,
    },
}

impl Inline {
    /// Append the plain-text value of this node to `out`
    pub fn push_text(&self, out: &mut String) {
        match self {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children)
            | Inline::Link { children, .. } => {
                for child in children {
                    child.push_text(out);
                }
            }
            Inline::Break { soft: true } => out.push(' '),
            Inline::Image { .. } | Inline::Html(_) | Inline::Break { soft: false } => {}
        }
    }
}

/// Flatten a sequence of inline nodes into plain text
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        inline.push_text(&mut out);
    }
    out
}

/// Block-level document element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A heading with depth and inline content
    Heading {
        /// Heading depth (1 = h1, 2 = h2, etc.)
        depth: u8,
        /// Inline content of the heading
        content: Vec<Inline>,
    },

    /// A paragraph of inline content
    Paragraph(Vec<Inline>),

    /// A code block
    CodeBlock {
        /// Language token from the info string (e.g., "rust")
        language: Option<String>,
        /// Remainder of the info string after the language
        meta: Option<String>,
        /// Raw code content
        code: String,
    },

    /// A horizontal rule
    Rule,

    /// HTML block content (preserved as-is)
    Html(String),
}

/// A parsed document: block nodes in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Blocks in the order they appear in the source
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a document from a list of blocks
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Iterate over every heading as `(depth, content)`
    pub fn headings(&self) -> impl Iterator<Item = (u8, &[Inline])> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Heading { depth, content } => Some((*depth, content.as_slice())),
            _ => None,
        })
    }
}
