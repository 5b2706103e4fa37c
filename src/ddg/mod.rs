//! DuckDuckGo instant-answer feed generation.
//!
//! The walk collects which identifiers live on which physical page, the
//! pages are parsed once each (a page can host dozens of members), and
//! every identifier yields one tab-delimited Abstract line plus redirect
//! candidates. Identifier kinds the page scraper cannot handle yet
//! (members documented inline on their class page, plain enums and enum
//! constants, variables) are skipped per identifier and reported in the
//! final summary; they never abort the batch.

pub mod abstracts;
pub mod desc;
pub mod page;
pub mod redirect;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use scraper::Html;
use std::sync::LazyLock;
use thiserror::Error;

use crate::link_map::LinkMap;
use crate::model::{EntityId, EntityIndex, EntityKind, StructureError};
use crate::walk::{ItemSink, WalkOptions, Walker};

use abstracts::{build_abstract, AbstractOptions};
use desc::DescOptions;
use redirect::{build_redirects, output_redirects, Redirect};

use regex::Regex;

const SOURCE_URL_PREFIX: &str = "http://en.cppreference.com/w/";

static RE_PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());
static RE_ANGLES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());

/// Recoverable per-identifier failures. The display strings double as the
/// reason tag in `--debug` diagnostic comments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DdgError {
    #[error("dcl table not found")]
    DclTableNotFound,
    #[error("dcl table contains no declarations")]
    NoDeclarations,
    #[error("all entries in dcl table were ignored")]
    AllDeclarationsIgnored,
    #[error("no elements after dcl table")]
    NoElementsAfterTable,
    #[error("versioned summary with no version supplied")]
    VersionedNoVersion,
    #[error("list items are not numbered")]
    ListNotNumbered,
    #[error("no description found")]
    NoDescription,
    /// Members documented inline on the class page.
    #[error("INLINEMEM")]
    InlineMember,
    /// Enums and variables; their declaration shape is not handled.
    #[error("ENUM")]
    EnumLike,
    #[error("ENUM_CONST")]
    EnumConst,
}

/// Feed entry kind, derived from the entity kind plus whether the entity is
/// documented inline (`link="."`) on its parent's page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ItemType {
    Class,
    Function,
    FunctionInline,
    Constructor,
    ConstructorInline,
    Destructor,
    DestructorInline,
    Enum,
    EnumConst,
    Variable,
    VariableInline,
}

/// Classifies one entity for feed processing; `None` means the entity kind
/// never appears in the feed (typedefs, specializations, overloads).
fn item_type(index: &EntityIndex, id: EntityId) -> Option<ItemType> {
    let node = index.node(id);
    let inline = node.link.as_deref() == Some(".");
    match node.kind {
        EntityKind::Const => {
            let parent_is_enum = node
                .parent
                .map(|p| index.node(p).kind == EntityKind::Enum)
                .unwrap_or(false);
            if parent_is_enum && inline {
                Some(ItemType::EnumConst)
            } else {
                None
            }
        }
        EntityKind::Function => Some(if inline {
            ItemType::FunctionInline
        } else {
            ItemType::Function
        }),
        EntityKind::Variable => Some(if inline {
            ItemType::VariableInline
        } else {
            ItemType::Variable
        }),
        EntityKind::Constructor => Some(if inline {
            ItemType::ConstructorInline
        } else {
            ItemType::Constructor
        }),
        EntityKind::Destructor => Some(if inline {
            ItemType::DestructorInline
        } else {
            ItemType::Destructor
        }),
        EntityKind::Class => Some(ItemType::Class),
        EntityKind::Enum => Some(ItemType::Enum),
        _ => None,
    }
}

/// The unqualified identifier: parameter lists, template arguments and
/// leading qualifiers stripped.
fn unqualified_name(ident: &str) -> String {
    let ident = RE_PARENS.replace_all(ident, "");
    let ident = RE_ANGLES.replace_all(&ident, "");
    match ident.rfind("::") {
        Some(pos) => ident[pos + 2..].to_string(),
        None => ident.to_string(),
    }
}

/// link → (identifier → type); the nested map deduplicates identifiers a
/// typedef expansion would otherwise repeat.
type IdentMap = BTreeMap<String, BTreeMap<String, ItemType>>;

#[derive(Default)]
struct IdentSink {
    map: IdentMap,
}

impl ItemSink for IdentSink {
    fn on_item(
        &mut self,
        walker: &Walker,
        id: EntityId,
        full_name: &str,
        full_link: &str,
    ) -> Result<(), StructureError> {
        if let Some(ty) = item_type(walker.index(), id) {
            self.map
                .entry(full_link.to_string())
                .or_default()
                .insert(full_name.to_string(), ty);
        }
        walker.process_children(self, id, full_name, full_link)
    }
}

/// Feed generation options.
#[derive(Debug, Clone, Default)]
pub struct DdgOptions {
    pub abstracts: AbstractOptions,
    pub desc: DescOptions,
    /// Emit `# error` diagnostic comments and line statistics.
    pub debug: bool,
    /// Restrict processing to pages hosting a matching identifier.
    pub debug_ident: Option<String>,
}

/// Generates the feed for `index` against the rendered pages in
/// `reference`, writing the output to `out_path`.
pub fn run(
    index: &EntityIndex,
    reference: &Path,
    out_path: &Path,
    opts: &DdgOptions,
) -> Result<()> {
    let mut sink = IdentSink::default();
    let walk_opts = WalkOptions {
        expand_typedefs: false,
        expand_inherits: true,
    };
    Walker::with_options(index, walk_opts).run(&mut sink)?;

    let link_map = LinkMap::build(reference)?;

    // batch identifiers by physical page so each page is parsed once
    struct PageJob {
        file: String,
        link: String,
        idents: BTreeMap<String, ItemType>,
    }
    let mut jobs: BTreeMap<String, PageJob> = BTreeMap::new();
    for (link, idents) in sink.map {
        let Some(file) = link_map.get(&link) else {
            continue;
        };
        let job = jobs.entry(file.to_string()).or_insert_with(|| PageJob {
            file: file.to_string(),
            link: link.clone(),
            idents: BTreeMap::new(),
        });
        job.idents.extend(idents);
    }
    let mut jobs: Vec<PageJob> = jobs.into_values().collect();
    jobs.sort_by(|a, b| a.link.cmp(&b.link));

    let mut out = String::new();
    let mut redirects: Vec<Redirect> = Vec::new();
    let mut emitted = 0usize;
    let mut skipped = 0usize;
    let mut line_stats: BTreeMap<usize, usize> = BTreeMap::new();

    for job in &jobs {
        if let Some(matcher) = &opts.debug_ident {
            if !job.idents.keys().any(|ident| ident.contains(matcher)) {
                continue;
            }
        }

        let path = reference.join(&job.file);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let doc = Html::parse_document(&text);

        for (ident, ty) in &job.idents {
            match process_identifier(&doc, ident, *ty, opts) {
                Ok(abstract_text) => {
                    if opts.debug {
                        let lines = abstract_text.matches('\n').count() + 1;
                        *line_stats.entry(lines).or_default() += 1;
                    }
                    out.push_str(&format!(
                        "{ident}\tA\t\t\t\t\t\t\t\t\t\t{}\t{}{}\n",
                        abstract_text.replace('\n', "\\n"),
                        SOURCE_URL_PREFIX,
                        job.link
                    ));
                    build_redirects(&mut redirects, ident, *ty);
                    emitted += 1;
                }
                Err(err) => {
                    skipped += 1;
                    if opts.debug {
                        out.push_str(&format!("# error ({err}): {}: {ident}\n", job.link));
                    }
                }
            }
        }
    }

    out.push_str(&output_redirects(&redirects));
    fs::write(out_path, &out)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    log::info!("{emitted} abstracts emitted, {skipped} identifiers skipped");
    if opts.debug {
        for (lines, count) in &line_stats {
            log::info!("abstracts spanning {lines} lines: {count}");
        }
    }
    Ok(())
}

/// Builds the abstract for one identifier, or reports why it cannot be
/// built. Inline members, enums, enum constants and variables are the known
/// unsupported shapes.
fn process_identifier(
    doc: &Html,
    ident: &str,
    ty: ItemType,
    opts: &DdgOptions,
) -> Result<String, DdgError> {
    match ty {
        ItemType::Class | ItemType::Function | ItemType::Constructor | ItemType::Destructor => {
            let name = unqualified_name(ident);
            let decls = page::declarations(doc, &name)?;
            let desc = page::short_description(doc, page::common_version(&decls), &opts.desc)?;
            Ok(build_abstract(&decls, &desc, &opts.abstracts))
        }
        ItemType::FunctionInline | ItemType::ConstructorInline | ItemType::DestructorInline => {
            Err(DdgError::InlineMember)
        }
        ItemType::Variable | ItemType::VariableInline | ItemType::Enum => Err(DdgError::EnumLike),
        ItemType::EnumConst => Err(DdgError::EnumConst),
    }
}
