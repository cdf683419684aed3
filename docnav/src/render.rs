//! HTML rendering of processed articles
//!
//! Produces a standalone page with:
//! - A navigation list built from the section tree
//! - Headings carrying their slug ids
//! - Code blocks rendered one element per line, with highlighted lines
//!   tagged for styling

use crate::article::{Article, CodeBlock};
use crate::code::{Line, Token};
use crate::outline::{Block, Inline, Section};

/// Render an article as a complete HTML page
pub fn to_html(article: &Article) -> String {
    let mut output = String::new();

    let title = article.title.as_deref().unwrap_or("Untitled");
    write_html_header(&mut output, title);

    output.push_str("<body>\n");
    if !article.sections.is_empty() {
        output.push_str(&render_nav(&article.sections));
    }

    output.push_str("<main class=\"article\">\n");
    write_body(&mut output, article);
    output.push_str("</main>\n");

    output.push_str("</body>\n");
    output.push_str("</html>\n");
    output
}

/// Write HTML header with CSS styling
fn write_html_header(output: &mut String, title: &str) {
    output.push_str("<!DOCTYPE html>\n");
    output.push_str("<html lang=\"en\">\n");
    output.push_str("<head>\n");
    output.push_str("<meta charset=\"UTF-8\">\n");
    output.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    output.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    output.push_str("<style>\n");
    output.push_str(CSS_STYLES);
    output.push_str("</style>\n");
    output.push_str("</head>\n");
}

/// Render the table of contents for a section forest
pub fn render_nav(sections: &[Section]) -> String {
    let mut output = String::from("<nav class=\"toc\">\n");
    write_section_list(&mut output, sections);
    output.push_str("</nav>\n");
    output
}

fn write_section_list(output: &mut String, sections: &[Section]) {
    output.push_str("<ul>\n");
    for section in sections {
        output.push_str(&format!(
            "<li data-depth=\"{}\"><a href=\"#{}\">{}</a>",
            section.depth,
            escape_html(&section.id),
            escape_html(&section.title)
        ));
        if !section.children.is_empty() {
            output.push('\n');
            write_section_list(output, &section.children);
        }
        output.push_str("</li>\n");
    }
    output.push_str("</ul>\n");
}

/// Write every block; headings and code blocks are paired with the
/// article's extracted headings and formatted code blocks in order
fn write_body(output: &mut String, article: &Article) {
    let mut headings = article.headings.iter();
    let mut code_blocks = article.code_blocks.iter();

    for block in &article.document.blocks {
        match block {
            Block::Heading { depth, content } => {
                let level = (*depth).clamp(1, 6);
                let id = headings.next().map(|h| h.id.as_str()).unwrap_or_default();
                output.push_str(&format!(
                    "<h{level} id=\"{}\">{}</h{level}>\n",
                    escape_html(id),
                    render_inlines(content)
                ));
            }
            Block::Paragraph(content) => {
                output.push_str(&format!("<p>{}</p>\n", render_inlines(content)));
            }
            Block::CodeBlock { .. } => {
                if let Some(code_block) = code_blocks.next() {
                    output.push_str(&render_code_block(code_block));
                }
            }
            Block::Rule => output.push_str("<hr>\n"),
            Block::Html(html) => output.push_str(html),
        }
    }
}

fn render_inlines(inlines: &[Inline]) -> String {
    let mut output = String::new();
    for inline in inlines {
        write_inline(&mut output, inline);
    }
    output
}

fn write_inline(output: &mut String, inline: &Inline) {
    match inline {
        Inline::Text(text) => output.push_str(&escape_html(text)),
        Inline::Code(code) => output.push_str(&format!("<code>{}</code>", escape_html(code))),
        Inline::Emphasis(children) => {
            output.push_str(&format!("<em>{}</em>", render_inlines(children)))
        }
        Inline::Strong(children) => {
            output.push_str(&format!("<strong>{}</strong>", render_inlines(children)))
        }
        Inline::Strikethrough(children) => {
            output.push_str(&format!("<del>{}</del>", render_inlines(children)))
        }
        Inline::Link { url, children } => output.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            escape_html(url),
            render_inlines(children)
        )),
        Inline::Image { url, alt } => output.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\">",
            escape_html(url),
            escape_html(alt)
        )),
        Inline::Html(html) => output.push_str(html),
        Inline::Break { soft: true } => output.push('\n'),
        Inline::Break { soft: false } => output.push_str("<br>\n"),
    }
}

/// Render a formatted code block
///
/// Line elements are written back to back: whitespace between them
/// would show up inside `<pre>`.
pub fn render_code_block(block: &CodeBlock) -> String {
    let mut output = String::from("<pre class=\"code\"");
    if let Some(language) = &block.language {
        output.push_str(&format!(" data-language=\"{}\"", escape_html(language)));
    }
    output.push_str("><code>");
    for line in &block.lines {
        write_line(&mut output, line);
    }
    output.push_str("</code></pre>\n");
    output
}

fn write_line(output: &mut String, line: &Line) {
    output.push_str(if line.highlighted {
        "<span class=\"line highlighted\">"
    } else {
        "<span class=\"line\">"
    });
    if line.is_blank() {
        output.push_str("<br>");
    } else {
        for token in line.tokens() {
            write_token(output, token);
        }
    }
    output.push_str("</span>");
}

fn write_token(output: &mut String, token: &Token) {
    match token {
        Token::Text(text) => output.push_str(&escape_html(text)),
        Token::Span {
            class_names,
            children,
        } => {
            if class_names.is_empty() {
                output.push_str("<span>");
            } else {
                output.push_str(&format!(
                    "<span class=\"{}\">",
                    escape_html(&class_names.join(" "))
                ));
            }
            for child in children {
                write_token(output, child);
            }
            output.push_str("</span>");
        }
    }
}

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const CSS_STYLES: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', sans-serif;
    line-height: 1.6;
    display: flex;
    gap: 2rem;
    margin: 0 auto;
    max-width: 1100px;
}

nav.toc {
    position: sticky;
    top: 0;
    align-self: flex-start;
    min-width: 14rem;
    font-size: 0.9rem;
}

nav.toc ul {
    list-style: none;
    padding-left: 1rem;
}

nav.toc a.active {
    font-weight: 600;
}

main.article {
    flex: 1;
    min-width: 0;
}

pre.code {
    background: #f6f8fa;
    padding: 0.75rem 0;
    overflow-x: auto;
}

pre.code .line {
    display: block;
    padding: 0 1rem;
}

pre.code .line.highlighted {
    background: #fff8c5;
}
"#;
