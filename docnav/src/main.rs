//! docnav - article navigation and code presentation tool

#![deny(unsafe_code)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OutlineFormat};
use docnav::code::{CodeFormatter, HighlightOptions};
use docnav::config::Config;
use docnav::outline::{Outline, Section};
use docnav::tracker::{ActiveSectionTracker, HeadingPositions};
use std::path::Path;

/// Main entry point for the docnav CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::init();
    }

    match cli.command {
        Commands::Outline { file, format } => {
            handle_outline_command(&file, format)?;
        }

        Commands::Active {
            file,
            positions,
            scroll_y,
            offset,
        } => {
            let config = load_config(cli.config.as_deref(), &file)?;
            handle_active_command(&file, &positions, scroll_y, offset, &config)?;
        }

        Commands::Code {
            file,
            lang,
            highlight,
            strict,
        } => {
            let config = load_config(cli.config.as_deref(), &file)?;
            handle_code_command(&file, lang, highlight, strict, &config)?;
        }

        Commands::Build { input, output } => {
            let config = match cli.config.as_deref() {
                Some(path) => load_config_file(path)?,
                None => Config::load_or_default(&input).with_context(|| {
                    format!("Failed to load config from {}", input.display())
                })?,
            };
            handle_build_command(&input, &output, &config)?;
        }
    }

    Ok(())
}

fn load_config_file(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}

/// Explicit config file, else docnav.toml beside `file`
fn load_config(explicit: Option<&Path>, file: &Path) -> Result<Config> {
    match explicit {
        Some(path) => load_config_file(path),
        None => {
            let dir = file
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            Config::load_or_default(dir)
                .with_context(|| format!("Failed to load config from {}", dir.display()))
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Handle the outline command
fn handle_outline_command(file: &Path, format: OutlineFormat) -> Result<()> {
    let outline = Outline::from_markdown(&read_file(file)?);

    match format {
        OutlineFormat::Text => {
            if outline.is_empty() {
                println!("(no headings)");
            }
            print_sections(&outline.sections, 0);
        }
        OutlineFormat::Json => {
            let json = serde_json::to_string_pretty(&outline)
                .context("Failed to serialize outline")?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn print_sections(sections: &[Section], indent: usize) {
    for section in sections {
        println!("{}{} (#{})", "  ".repeat(indent), section.title, section.id);
        print_sections(&section.children, indent + 1);
    }
}

/// Handle the active command
fn handle_active_command(
    file: &Path,
    positions_path: &Path,
    scroll_y: f64,
    offset: Option<f64>,
    config: &Config,
) -> Result<()> {
    let outline = Outline::from_markdown(&read_file(file)?);
    let positions = HeadingPositions::from_toml(&read_file(positions_path)?)
        .with_context(|| format!("Failed to parse positions {}", positions_path.display()))?;

    for entry in &positions.heading {
        if outline.ancestors.get(&entry.id).is_none() {
            log::warn!("Position given for unknown heading id '{}'", entry.id);
        }
    }

    let mut tracker = ActiveSectionTracker::with_options(outline.ancestors, config.tracker);
    positions.register_all(&mut tracker);

    let offset = offset.unwrap_or(config.tracker.offset);
    let state = tracker.recompute(scroll_y, offset);

    let json = serde_json::to_string_pretty(state).context("Failed to serialize state")?;
    println!("{}", json);
    Ok(())
}

/// Handle the code command
fn handle_code_command(
    file: &Path,
    lang: Option<String>,
    highlight: Option<String>,
    strict: bool,
    config: &Config,
) -> Result<()> {
    let code = read_file(file)?;
    let language = lang.or_else(|| {
        file.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_string)
    });

    let options = HighlightOptions {
        ignore_missing_grammar: config.highlight.ignore_missing_grammar && !strict,
        ..config.highlight.clone()
    };
    let lines = CodeFormatter::new(&options)
        .format(&code, language.as_deref(), highlight.as_deref())
        .with_context(|| format!("Failed to format {}", file.display()))?;

    let width = lines.len().to_string().len();
    for (index, line) in lines.iter().enumerate() {
        let marker = if line.highlighted { '>' } else { ' ' };
        println!("{}{:>width$} | {}", marker, index + 1, line.text());
    }

    Ok(())
}

/// Handle the build command
fn handle_build_command(input: &Path, output: &Path, config: &Config) -> Result<()> {
    println!("Building articles...");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());

    let summary = docnav::build_directory(input, output, config)
        .with_context(|| format!("Failed to build {}", input.display()))?;

    println!(
        "Built {} articles ({} code blocks)",
        summary.articles(),
        summary.code_blocks
    );
    Ok(())
}
