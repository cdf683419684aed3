//! Markdown event stream parser
//!
//! Converts pulldown-cmark's event stream into a flat, document-ordered list
//! of blocks. Container blocks (quotes, lists, tables) are flattened: their
//! headings, paragraphs and code blocks appear in the output in source order.

use super::blocks::{Block, Document, Inline};
use pulldown_cmark::{CodeBlockKind, Event, Options, Tag, TagEnd};

/// Kind of an open inline container
#[derive(Debug, Clone, PartialEq, Eq)]
enum FrameKind {
    /// Root of a heading's inline content
    Heading(u8),
    /// Root of a paragraph, list item or table cell
    Paragraph,
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    /// Superscript/subscript: children are spliced into the parent
    Transparent,
}

/// An open inline container and the children collected so far
struct Frame {
    kind: FrameKind,
    children: Vec<Inline>,
}

/// Builder for a code block
struct CodeBlockBuilder {
    language: Option<String>,
    meta: Option<String>,
    code: String,
}

/// Parser state for converting markdown events to blocks
pub struct MarkdownParser {
    /// Stack of open inline containers; the bottom frame is a block root
    frames: Vec<Frame>,

    /// Code block being built
    code_block: Option<CodeBlockBuilder>,

    /// Image being built: (url, alt text so far)
    image: Option<(String, String)>,

    /// HTML block being built
    html_block: Option<String>,

    /// Completed blocks
    blocks: Vec<Block>,
}

impl MarkdownParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            code_block: None,
            image: None,
            html_block: None,
            blocks: Vec::new(),
        }
    }

    /// Parse markdown content into a document
    ///
    /// # Parameters
    /// * `content` - Raw markdown content to parse
    ///
    /// # Returns
    /// * `Document` - Blocks in document order
    pub fn parse(content: &str) -> Document {
        let mut parser = Self::new();
        let options =
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_HEADING_ATTRIBUTES;

        for event in pulldown_cmark::Parser::new_ext(content, options) {
            parser.process_event(event);
        }

        parser.finalize();
        log::debug!("Parsed {} blocks", parser.blocks.len());
        Document::new(parser.blocks)
    }

    /// Process a single markdown event
    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.handle_start_tag(tag),
            Event::End(tag_end) => self.handle_end_tag(tag_end),
            Event::Text(text) => self.handle_text(&text),
            Event::Code(code) | Event::InlineMath(code) | Event::DisplayMath(code) => {
                self.push_inline(Inline::Code(code.to_string()))
            }
            Event::SoftBreak => self.push_inline(Inline::Break { soft: true }),
            Event::HardBreak => self.push_inline(Inline::Break { soft: false }),
            Event::Html(html) => self.handle_html(&html),
            Event::InlineHtml(html) => self.push_inline(Inline::Html(html.to_string())),
            Event::Rule => {
                self.flush_paragraph();
                self.blocks.push(Block::Rule);
            }
            Event::FootnoteReference(_) | Event::TaskListMarker(_) => {}
        }
    }

    /// Handle opening tags
    fn handle_start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::TableCell => {
                self.flush_paragraph();
                self.open_frame(FrameKind::Paragraph);
            }
            Tag::Heading { level, .. } => {
                self.flush_paragraph();
                self.open_frame(FrameKind::Heading(level as u8));
            }
            Tag::CodeBlock(kind) => {
                self.flush_paragraph();
                self.code_block = Some(Self::code_block_builder(kind));
            }
            Tag::HtmlBlock => {
                self.flush_paragraph();
                self.html_block = Some(String::new());
            }
            Tag::BlockQuote(_)
            | Tag::List(_)
            | Tag::Item
            | Tag::Table(_)
            | Tag::TableHead
            | Tag::TableRow
            | Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {
                self.flush_paragraph();
            }
            Tag::Emphasis => self.open_frame(FrameKind::Emphasis),
            Tag::Strong => self.open_frame(FrameKind::Strong),
            Tag::Strikethrough => self.open_frame(FrameKind::Strikethrough),
            Tag::Superscript | Tag::Subscript => self.open_frame(FrameKind::Transparent),
            Tag::Link { dest_url, .. } => self.open_frame(FrameKind::Link(dest_url.to_string())),
            Tag::Image { dest_url, .. } => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            Tag::MetadataBlock(_) => {}
        }
    }

    /// Handle closing tags
    fn handle_end_tag(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Paragraph | TagEnd::TableCell | TagEnd::Item => self.flush_paragraph(),
            TagEnd::Heading(_) => self.finish_heading(),
            TagEnd::CodeBlock => {
                if let Some(builder) = self.code_block.take() {
                    self.blocks.push(Block::CodeBlock {
                        language: builder.language,
                        meta: builder.meta,
                        code: builder.code,
                    });
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html_block.take() {
                    self.blocks.push(Block::Html(html));
                }
            }
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript
            | TagEnd::Link => self.close_frame(),
            TagEnd::Image => {
                if let Some((url, alt)) = self.image.take() {
                    self.push_inline(Inline::Image { url, alt });
                }
            }
            TagEnd::BlockQuote(_)
            | TagEnd::List(_)
            | TagEnd::Table
            | TagEnd::TableHead
            | TagEnd::TableRow
            | TagEnd::FootnoteDefinition
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => self.flush_paragraph(),
            TagEnd::MetadataBlock(_) => {}
        }
    }

    /// Split a code block info string into language and remaining metadata
    fn code_block_builder(kind: CodeBlockKind<'_>) -> CodeBlockBuilder {
        let (language, meta) = match kind {
            CodeBlockKind::Fenced(info) => {
                let info = info.trim();
                match info.split_once(char::is_whitespace) {
                    Some((lang, rest)) => {
                        let rest = rest.trim();
                        (
                            Some(lang.to_string()),
                            (!rest.is_empty()).then(|| rest.to_string()),
                        )
                    }
                    None => ((!info.is_empty()).then(|| info.to_string()), None),
                }
            }
            CodeBlockKind::Indented => (None, None),
        };

        CodeBlockBuilder {
            language,
            meta,
            code: String::new(),
        }
    }

    /// Handle text content
    fn handle_text(&mut self, text: &str) {
        if let Some(builder) = self.code_block.as_mut() {
            builder.code.push_str(text);
            return;
        }

        if let Some((_, alt)) = self.image.as_mut() {
            alt.push_str(text);
            return;
        }

        if !text.is_empty() {
            self.push_inline(Inline::Text(text.to_string()));
        }
    }

    /// Handle HTML content
    fn handle_html(&mut self, html: &str) {
        match self.html_block.as_mut() {
            Some(buffer) => buffer.push_str(html),
            None => {
                self.flush_paragraph();
                self.blocks.push(Block::Html(html.to_string()));
            }
        }
    }

    fn open_frame(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            kind,
            children: Vec::new(),
        });
    }

    /// Close the innermost inline container and attach it to its parent
    fn close_frame(&mut self) {
        // Never pop a block root here
        if self.frames.len() < 2 {
            return;
        }
        let Some(frame) = self.frames.pop() else {
            return;
        };

        let node = match frame.kind {
            FrameKind::Emphasis => Inline::Emphasis(frame.children),
            FrameKind::Strong => Inline::Strong(frame.children),
            FrameKind::Strikethrough => Inline::Strikethrough(frame.children),
            FrameKind::Link(url) => Inline::Link {
                url,
                children: frame.children,
            },
            FrameKind::Transparent | FrameKind::Heading(_) | FrameKind::Paragraph => {
                for child in frame.children {
                    self.push_inline(child);
                }
                return;
            }
        };
        self.push_inline(node);
    }

    /// Append an inline node to the innermost open container
    ///
    /// Inline content that appears outside any block root (e.g. the text of
    /// a tight list item) opens an implicit paragraph.
    fn push_inline(&mut self, inline: Inline) {
        if let Some((_, alt)) = self.image.as_mut() {
            let mut text = String::new();
            inline.push_text(&mut text);
            alt.push_str(&text);
            return;
        }

        if self.frames.is_empty() {
            self.open_frame(FrameKind::Paragraph);
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.children.push(inline);
        }
    }

    /// Collapse all open frames into their root and return it
    fn collapse_frames(&mut self) -> Option<Frame> {
        while self.frames.len() > 1 {
            self.close_frame();
        }
        self.frames.pop()
    }

    /// Finish the current paragraph, if any
    fn flush_paragraph(&mut self) {
        let Some(root) = self.collapse_frames() else {
            return;
        };

        match root.kind {
            FrameKind::Heading(depth) => self.blocks.push(Block::Heading {
                depth,
                content: root.children,
            }),
            _ => {
                if !root.children.is_empty() {
                    self.blocks.push(Block::Paragraph(root.children));
                }
            }
        }
    }

    /// Finish a heading
    fn finish_heading(&mut self) {
        let Some(root) = self.collapse_frames() else {
            return;
        };

        let depth = match root.kind {
            FrameKind::Heading(depth) => depth,
            _ => {
                log::warn!("Heading end without a matching heading start");
                return;
            }
        };

        self.blocks.push(Block::Heading {
            depth,
            content: root.children,
        });
    }

    /// Finalize any remaining content
    fn finalize(&mut self) {
        self.flush_paragraph();
        if let Some(builder) = self.code_block.take() {
            self.blocks.push(Block::CodeBlock {
                language: builder.language,
                meta: builder.meta,
                code: builder.code,
            });
        }
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse markdown content into a document
pub fn parse_document(content: &str) -> Document {
    MarkdownParser::parse(content)
}
