//! refindex — transform a C/C++ reference identifier index into
//! distributable documentation outputs.
//!
//! The identifier index is a hierarchical XML description of every
//! documented entity (classes, functions, enums, typedefs, inherited
//! members). One traversal engine resolves each entity's fully-qualified
//! name and link; the subcommands are different renderings of that same
//! expansion:
//!
//! - **search** / **highlight** — flat `name => link` lists
//! - **browser** — a nested HTML tree of the whole index
//! - **devhelp** — DevHelp book keywords
//! - **doxygen-tag** — a Doxygen tag file with namespace/class grouping
//! - **autolinker** — JSON link definitions for the AutoLinker extension
//! - **ddg** — the DuckDuckGo instant-answer feed (abstracts + redirects)
//! - **link-map** — the page-title → file-path table the above consume

mod ddg;
mod link_map;
mod model;
mod parser;
mod render;
mod resolve;
mod walk;
mod xml;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use link_map::LinkMap;
use model::EntityIndex;
use render::devhelp::BookMeta;

#[derive(Parser)]
#[command(
    name = "refindex",
    about = "Generate search, browser, DevHelp, Doxygen, AutoLinker and DuckDuckGo outputs from a reference identifier index"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the page-title → file-path map from a rendered HTML tree
    LinkMap {
        /// Root directory of the rendered HTML pages
        root: PathBuf,
        /// Destination link map XML file
        output: PathBuf,
    },

    /// Emit a flat `name => link` search list
    Search {
        /// Identifier index XML file
        index: PathBuf,
        /// Destination file
        output: PathBuf,
    },

    /// Emit the identifier list used for syntax highlighting definitions
    Highlight {
        index: PathBuf,
        output: PathBuf,
    },

    /// Emit a browsable nested HTML tree of the whole index
    Browser {
        index: PathBuf,
        output: PathBuf,
    },

    /// Emit a DevHelp book with one keyword per identifier
    Devhelp {
        /// Location of the installed book
        #[arg(long)]
        base: String,

        /// File with the chapter structure to include verbatim
        #[arg(long)]
        chapters: PathBuf,

        /// Title of the book
        #[arg(long)]
        title: String,

        /// Package name of the book
        #[arg(long)]
        name: String,

        /// Landing page link relative to the documentation root
        #[arg(long)]
        link: String,

        index: PathBuf,
        output: PathBuf,
    },

    /// Emit a Doxygen tag file with namespace/class grouping
    DoxygenTag {
        /// Link map XML file, or `web` to keep the logical links
        link_map: String,
        index: PathBuf,
        output: PathBuf,
    },

    /// Emit AutoLinker group/link definitions as JSON
    Autolinker {
        index: PathBuf,
        output: PathBuf,
    },

    /// Emit the DuckDuckGo instant-answer feed
    Ddg {
        /// Put each declaration into a separate code snippet
        #[arg(long)]
        split_code_snippets: bool,

        /// Maximum number of lines of code to show in an abstract
        #[arg(long, default_value_t = 6)]
        max_code_lines: usize,

        /// Maximum number of sentences in a description
        #[arg(long, default_value_t = 1)]
        max_sentences: usize,

        /// Maximum number of characters in a description
        #[arg(long, default_value_t = 200)]
        max_characters: usize,

        /// Maximum size of parenthesized text kept in a description
        #[arg(long, default_value_t = 40)]
        max_paren_chars: usize,

        /// Write diagnostic comments for skipped identifiers
        #[arg(long)]
        debug: bool,

        /// Process only identifiers containing this substring
        #[arg(long)]
        debug_ident: Option<String>,

        index: PathBuf,
        /// Directory with the rendered reference pages
        reference: PathBuf,
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::LinkMap { root, output } => {
            let map = LinkMap::build(&root)?;
            map.write(&output)?;
            log::info!("{} pages mapped", map.len());
            Ok(())
        }

        Command::Search { index, output } => {
            let index = load_index(&index)?;
            write_output(&output, &render::search::render(&index)?)
        }

        Command::Highlight { index, output } => {
            let index = load_index(&index)?;
            write_output(&output, &render::highlight::render(&index)?)
        }

        Command::Browser { index, output } => {
            let index = load_index(&index)?;
            write_output(&output, &render::browser::render(&index)?)
        }

        Command::Devhelp {
            base,
            chapters,
            title,
            name,
            link,
            index,
            output,
        } => {
            let chapters = fs::read_to_string(&chapters)
                .with_context(|| format!("failed to read {}", chapters.display()))?;
            let book = BookMeta {
                title: &title,
                name: &name,
                base: &base,
                rel_link: &link,
            };
            let index = load_index(&index)?;
            write_output(&output, &render::devhelp::render(&index, &book, &chapters)?)
        }

        Command::DoxygenTag {
            link_map,
            index,
            output,
        } => {
            let map = if link_map == "web" {
                None
            } else {
                Some(LinkMap::read(Path::new(&link_map))?)
            };
            let index = load_index(&index)?;
            write_output(&output, &render::doxygen::render(&index, map.as_ref())?)
        }

        Command::Autolinker { index, output } => {
            let index = load_index(&index)?;
            write_output(&output, &render::autolinker::render(&index)?)
        }

        Command::Ddg {
            split_code_snippets,
            max_code_lines,
            max_sentences,
            max_characters,
            max_paren_chars,
            debug,
            debug_ident,
            index,
            reference,
            output,
        } => {
            let opts = ddg::DdgOptions {
                abstracts: ddg::abstracts::AbstractOptions {
                    max_code_lines,
                    split_code_snippets,
                },
                desc: ddg::desc::DescOptions {
                    max_sentences,
                    max_chars: max_characters,
                    max_paren_chars,
                },
                debug,
                debug_ident,
            };
            let index = load_index(&index)?;
            ddg::run(&index, &reference, &output, &opts)
        }
    }
}

fn load_index(path: &Path) -> Result<EntityIndex> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parser::parse_index(&text)
        .with_context(|| format!("failed to parse index {}", path.display()))
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
