//! Command-line interface definitions for docnav

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for the outline command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutlineFormat {
    /// Indented tree with ids
    #[default]
    Text,
    /// Headings and section tree as JSON
    Json,
}

/// CLI structure for the docnav application
#[derive(Parser)]
#[command(name = "docnav")]
#[command(version)]
#[command(about = "Article outlines, active-section tracking and code line formatting", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to docnav.toml next to the input, if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands for docnav
#[derive(Subcommand)]
pub enum Commands {
    /// Print the section tree of a markdown file
    Outline {
        /// Markdown file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutlineFormat,
    },

    /// Compute the active section for a scroll position
    Active {
        /// Markdown file
        file: PathBuf,

        /// TOML file with rendered heading positions (`[[heading]]` id, top, margin)
        #[arg(short, long, value_name = "TOML")]
        positions: PathBuf,

        /// Vertical scroll position
        #[arg(long, value_name = "Y", allow_negative_numbers = true)]
        scroll_y: f64,

        /// Offset added to the scroll position (overrides the config file)
        #[arg(long, value_name = "O", allow_negative_numbers = true)]
        offset: Option<f64>,
    },

    /// Format a source file into numbered lines
    Code {
        /// Source file
        file: PathBuf,

        /// Language name or extension (defaults to the file extension)
        #[arg(short, long)]
        lang: Option<String>,

        /// Lines to highlight, e.g. "1,4-6"
        #[arg(long, value_name = "SPEC")]
        highlight: Option<String>,

        /// Fail when no grammar exists for the language
        #[arg(long)]
        strict: bool,
    },

    /// Render a directory of markdown articles to HTML
    Build {
        /// Input directory (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
}
