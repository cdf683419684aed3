//! docnav - article navigation and code presentation
//!
//! Builds the table of contents of a markdown article (unique heading ids
//! and a nested section tree), tracks which section is active while the
//! article scrolls, and splits highlighted code blocks into renderable
//! lines.

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod article;
pub mod code;
pub mod config;
pub mod outline;
pub mod render;
pub mod tracker;

pub use article::{build_directory, parse_article, Article, ArticleError, BuildSummary};
pub use code::{CodeFormatter, HighlightError, HighlightOptions, Line, Token};
pub use config::{Config, ConfigError};
pub use outline::{AncestorMap, Heading, Outline, Section, Slugger};
pub use tracker::{ActiveSectionState, ActiveSectionTracker, PositionSource, StaticPosition};
