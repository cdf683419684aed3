//! Article processing pipeline
//!
//! This module ties the stages together for one markdown article:
//! 1. **Parsing**: markdown -> [`Document`]
//! 2. **Outline**: headings, section tree and ancestor map
//! 3. **Code**: every code block tokenized and split into lines
//!
//! [`build_directory`] runs the pipeline over a directory tree and writes
//! one HTML page per article.

use crate::code::{CodeFormatter, HighlightError, Line};
use crate::config::Config;
use crate::outline::{parse_document, AncestorMap, Block, Document, Heading, Outline, Section};
use crate::render;
use itertools::Itertools;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A formatted code block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// Language from the info string
    pub language: Option<String>,
    /// Highlight spec from the `highlight=` attribute
    pub highlight: Option<String>,
    /// Formatted lines
    pub lines: Vec<Line>,
}

/// A fully processed article
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    /// Text of the first depth-1 heading
    pub title: Option<String>,
    /// Headings in document order
    pub headings: Vec<Heading>,
    /// Nested sections
    pub sections: Vec<Section>,
    /// Ancestor chain of every section id
    #[serde(skip)]
    pub ancestors: AncestorMap,
    /// Code blocks in document order
    pub code_blocks: Vec<CodeBlock>,
    /// Parsed source, used for rendering
    #[serde(skip)]
    pub document: Document,
}

impl Article {
    /// Outline view of this article
    pub fn outline(&self) -> Outline {
        Outline {
            headings: self.headings.clone(),
            sections: self.sections.clone(),
            ancestors: self.ancestors.clone(),
        }
    }
}

/// Result of a directory build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Pages written, sorted by path
    pub outputs: Vec<PathBuf>,
    /// Total number of code blocks formatted
    pub code_blocks: usize,
}

impl BuildSummary {
    /// Number of articles built
    pub fn articles(&self) -> usize {
        self.outputs.len()
    }
}

/// Process one markdown article
///
/// # Parameters
/// * `markdown` - Article source
/// * `config` - Highlighting options are taken from `config.highlight`
///
/// # Returns
/// * `Ok(Article)` - Outline and formatted code blocks
/// * `Err(ArticleError)` - A code block could not be formatted
pub fn parse_article(markdown: &str, config: &Config) -> Result<Article, ArticleError> {
    let document = parse_document(markdown);
    let Outline {
        headings,
        sections,
        ancestors,
    } = Outline::from_document(&document);

    let formatter = CodeFormatter::new(&config.highlight);
    let code_blocks = document
        .blocks
        .iter()
        .filter_map(|block| match block {
            Block::CodeBlock {
                language,
                meta,
                code,
            } => Some((language, meta, code)),
            _ => None,
        })
        .enumerate()
        .map(|(index, (language, meta, code))| -> Result<CodeBlock, ArticleError> {
            let highlight = meta.as_deref().and_then(highlight_attribute);
            let lines = formatter
                .format(code, language.as_deref(), highlight.as_deref())
                .map_err(|source| ArticleError::CodeBlock { index, source })?;
            Ok(CodeBlock {
                language: language.clone(),
                highlight,
                lines,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let title = headings
        .iter()
        .find(|heading| heading.depth == 1)
        .map(|heading| heading.title.clone());

    log::debug!(
        "Parsed article: {} headings, {} code blocks",
        headings.len(),
        code_blocks.len()
    );

    Ok(Article {
        title,
        headings,
        sections,
        ancestors,
        code_blocks,
        document,
    })
}

/// Read and process a markdown file
pub fn parse_article_file(path: &Path, config: &Config) -> Result<Article, ArticleError> {
    let content =
        fs::read_to_string(path).map_err(|e| ArticleError::IoError(path.to_path_buf(), e))?;

    parse_article(&content, config)
        .map_err(|e| ArticleError::InFile(path.to_path_buf(), Box::new(e)))
}

/// Extract the value of a `highlight=` attribute from a code block info string
///
/// Accepts `highlight=1,4-6`, `highlight="1, 4-6"` and the braced form
/// `{highlight=1,4-6}`.
pub fn highlight_attribute(meta: &str) -> Option<String> {
    let meta = meta.trim().trim_start_matches('{').trim_end_matches('}');
    let (_, rest) = meta.split_once("highlight=")?;

    let value = match rest.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let inner = &rest[1..];
            inner.split(quote).next().unwrap_or(inner)
        }
        _ => rest.split(char::is_whitespace).next().unwrap_or(rest),
    };

    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Render every markdown file under `input` to HTML under `output`
///
/// `docs/guide/intro.md` is written to `<output>/guide/intro.html`.
///
/// # Parameters
/// * `input` - Directory to search for `*.md` files
/// * `output` - Directory receiving the HTML pages (created if needed)
/// * `config` - Build configuration
///
/// # Returns
/// * `Ok(BuildSummary)` - Pages written
/// * `Err(ArticleError)` - First error reading, formatting or writing an article
pub fn build_directory(
    input: &Path,
    output: &Path,
    config: &Config,
) -> Result<BuildSummary, ArticleError> {
    if !input.is_dir() {
        return Err(ArticleError::MissingInput(input.to_path_buf()));
    }

    let sources = discover_markdown(input);
    log::info!("Found {} markdown files in {}", sources.len(), input.display());

    #[cfg(feature = "parallel")]
    let built: Result<Vec<_>, _> = sources
        .par_iter()
        .map(|path| build_one(path, input, output, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let built: Result<Vec<_>, _> = sources
        .iter()
        .map(|path| build_one(path, input, output, config))
        .collect();

    let built = built?;
    let summary = BuildSummary {
        code_blocks: built.iter().map(|(_, blocks)| blocks).sum(),
        outputs: built.into_iter().map(|(path, _)| path).collect(),
    };

    log::info!(
        "Wrote {} pages ({} code blocks) to {}",
        summary.articles(),
        summary.code_blocks,
        output.display()
    );
    Ok(summary)
}

/// Markdown files under `root`, sorted
fn discover_markdown(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("md"))
        .map(|e| e.path().to_path_buf())
        .sorted()
        .collect()
}

/// Build one page; returns its output path and code block count
fn build_one(
    path: &Path,
    input: &Path,
    output: &Path,
    config: &Config,
) -> Result<(PathBuf, usize), ArticleError> {
    log::debug!("Building {}", path.display());
    let article = parse_article_file(path, config)?;

    let relative = path.strip_prefix(input).unwrap_or(path);
    let target = output.join(relative).with_extension("html");
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| ArticleError::WriteError(parent.to_path_buf(), e))?;
    }
    fs::write(&target, render::to_html(&article))
        .map_err(|e| ArticleError::WriteError(target.clone(), e))?;

    Ok((target, article.code_blocks.len()))
}

/// Article processing errors
#[derive(Error, Debug)]
pub enum ArticleError {
    #[error("Code block {index} could not be formatted: {source}")]
    CodeBlock {
        index: usize,
        #[source]
        source: HighlightError,
    },

    #[error("IO error reading {path}: {1}", path = .0.display())]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("IO error writing {path}: {1}", path = .0.display())]
    WriteError(PathBuf, #[source] std::io::Error),

    #[error("Error processing {path}: {1}", path = .0.display())]
    InFile(PathBuf, #[source] Box<ArticleError>),

    #[error("Input directory not found: {path}", path = .0.display())]
    MissingInput(PathBuf),
}
