mod init;
pub use init::cmd_init;

use std::path::PathBuf;

use crate::cli::commands::*;
use crate::cli::output;
use crate::io::config_io::{self, BookError};
use crate::io::draft;
use crate::io::lock::BookLock;
use crate::io::store::FileStore;
use crate::model::{BookConfig, BudgetTree, FrequencyUnit, ItemId};
use crate::ops::{self, mutate, validate};
use crate::sync::{self, BudgetGateway, SaveError, SaveScope};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let start = match cli.book_dir {
        Some(ref dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };

    match cli.command {
        // Init runs before book discovery
        Commands::Init(args) => cmd_init(args, &start),

        Commands::Checkout(args) => cmd_checkout(args, &start),
        Commands::Tree => cmd_tree(&start, json),
        Commands::Show(args) => cmd_show(args, &start, json),
        Commands::Add(args) => cmd_add(args, &start),
        Commands::Sib(args) => cmd_sib(args, &start),
        Commands::Root(args) => cmd_root(args, &start),
        Commands::Set(args) => cmd_set(args, &start),
        Commands::Rm(args) => cmd_rm(args, &start),
        Commands::Restore(args) => cmd_restore(args, &start),
        Commands::Check => cmd_check(&start, json),
        Commands::Save => cmd_save(&start, json),
    }
}

// ---------------------------------------------------------------------------
// Book context
// ---------------------------------------------------------------------------

struct Book {
    dir: PathBuf,
    config: BookConfig,
}

impl Book {
    fn load(start: &std::path::Path) -> Result<Self, BookError> {
        let dir = config_io::discover_book(start)?;
        let config = config_io::read_config(&dir)?;
        Ok(Book { dir, config })
    }

    fn store(&self) -> Result<FileStore, Box<dyn std::error::Error>> {
        Ok(FileStore::open(&self.dir.join(&self.config.store.file))?)
    }

    fn scope(&self) -> SaveScope {
        SaveScope {
            category_id: self.config.scope.category_id,
            period_id: self.config.scope.period_id,
        }
    }
}

/// Resolve a display code to a node id, with a user-facing error.
fn resolve(tree: &BudgetTree, code: &str) -> Result<ItemId, mutate::TreeError> {
    tree.find_by_code(code)
        .ok_or_else(|| mutate::TreeError::NotFound(code.to_string()))
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

fn cmd_checkout(args: CheckoutArgs, start: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let book = Book::load(start)?;
    let _lock = BookLock::acquire_default(&book.dir)?;
    if draft::draft_exists(&book.dir) && !args.force {
        return Err("a session is already open; `bt save` it or rerun with --force".into());
    }

    let store = book.store()?;
    let scope = book.scope();
    let records = store.list(scope.category_id, scope.period_id)?;
    let mut tree = BudgetTree::from_records(&records);
    ops::normalize(&mut tree);
    draft::write_draft(&book.dir, &tree)?;
    println!("checked out {} item(s) from {}", tree.len(), book.config.store.file);
    Ok(())
}

fn cmd_tree(start: &std::path::Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let book = Book::load(start)?;
    let tree = draft::read_draft(&book.dir)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&output::tree_json(&tree))?);
    } else if tree.is_empty() {
        println!("(empty tree; add a top-level item with `bt root <name>`)");
    } else {
        print!("{}", output::render_tree(&tree));
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, start: &std::path::Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let book = Book::load(start)?;
    let tree = draft::read_draft(&book.dir)?;
    let id = resolve(&tree, &args.code)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&output::item_json(&tree, id))?);
    } else {
        print!("{}", output::render_item_detail(&tree, id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Structure edits
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, start: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    with_session(start, |tree| {
        let parent = resolve(tree, &args.parent)?;
        let id = mutate::add_child(tree, parent, args.name.clone())?;
        Ok(format!("added {}  {}", tree.nodes[&id].code, args.name))
    })
}

fn cmd_sib(args: SibArgs, start: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    with_session(start, |tree| {
        let after = resolve(tree, &args.after)?;
        let id = mutate::add_sibling(tree, after, args.name.clone())?;
        Ok(format!("added {}  {}", tree.nodes[&id].code, args.name))
    })
}

fn cmd_root(args: RootArgs, start: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    with_session(start, |tree| {
        let id = mutate::add_root(tree, args.name.clone());
        Ok(format!("added {}  {}", tree.nodes[&id].code, args.name))
    })
}

fn cmd_set(args: SetArgs, start: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let per: Option<FrequencyUnit> = match &args.per {
        Some(s) => Some(s.parse::<FrequencyUnit>()?),
        None => None,
    };
    with_session(start, |tree| {
        let id = resolve(tree, &args.code)?;
        if let Some(name) = &args.name {
            mutate::set_name(tree, id, name.clone())?;
        }
        if let Some(desc) = &args.desc {
            mutate::set_description(tree, id, desc.clone())?;
        }
        if args.clear {
            mutate::set_frequency(tree, id, None, None)?;
            mutate::set_unit_amount(tree, id, None)?;
            mutate::set_total_target(tree, id, None)?;
        }
        if args.freq.is_some() || per.is_some() {
            let node = &tree.nodes[&id];
            let freq = args.freq.or(node.target_frequency);
            let unit = per.or(node.frequency_unit);
            mutate::set_frequency(tree, id, freq, unit)?;
        }
        if let Some(amount) = args.amount {
            mutate::set_unit_amount(tree, id, Some(amount))?;
        }
        if let Some(total) = args.total {
            mutate::set_total_target(tree, id, Some(total))?;
        }
        let node = &tree.nodes[&id];
        Ok(match node.total_target {
            Some(total) => format!(
                "{}  {}  total {}",
                node.code,
                node.name,
                output::format_amount(total)
            ),
            None => format!("{}  {}", node.code, node.name),
        })
    })
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

fn cmd_rm(args: RmArgs, start: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let book = Book::load(start)?;
    let _lock = BookLock::acquire_default(&book.dir)?;
    let mut tree = draft::read_draft(&book.dir)?;
    let id = resolve(&tree, &args.code)?;
    let subtree = tree.subtree_ids(id).len();

    let message = if id.is_temp() && !args.now {
        // Unsaved nodes have nothing to defer; they just go away.
        mutate::remove_subtree(&mut tree, id)?;
        format!("removed {} ({} item(s), never saved)", args.code, subtree)
    } else if args.now {
        let mut store = book.store()?;
        let deleted = sync::delete_now(&mut tree, &mut store, id)?;
        format!("deleted {} ({} record(s) removed from store)", args.code, deleted)
    } else {
        mutate::mark_deleted(&mut tree, id)?;
        format!(
            "marked {} for deletion ({} item(s), resolves at next save; `bt restore {}` to undo)",
            args.code, subtree, args.code
        )
    };
    draft::write_draft(&book.dir, &tree)?;
    println!("{}", message);
    Ok(())
}

fn cmd_restore(args: RestoreArgs, start: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    with_session(start, |tree| {
        let id = resolve(tree, &args.code)?;
        mutate::cancel_deletion(tree, id)?;
        Ok(format!("restored {}", args.code))
    })
}

// ---------------------------------------------------------------------------
// Validation & save
// ---------------------------------------------------------------------------

fn cmd_check(start: &std::path::Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let book = Book::load(start)?;
    let tree = draft::read_draft(&book.dir)?;
    let result = validate::validate(&tree);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.valid {
        println!("ok: {} item(s), ready to save", tree.len());
    } else {
        for issue in &result.issues {
            println!("error: {}", issue);
        }
    }
    if result.valid {
        Ok(())
    } else {
        Err(format!("{} validation issue(s)", result.issues.len()).into())
    }
}

fn cmd_save(start: &std::path::Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let book = Book::load(start)?;
    let _lock = BookLock::acquire_default(&book.dir)?;
    let mut tree = draft::read_draft(&book.dir)?;
    let mut store = book.store()?;

    match sync::save(&mut tree, &mut store, book.scope()) {
        Ok(report) => {
            // The tree now mirrors the store; the session continues from it.
            draft::write_draft(&book.dir, &tree)?;
            for warning in &report.warnings {
                eprintln!("warning: {}", warning);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&output::save_report_json(&report))?);
            } else {
                println!("{}", output::render_save_summary(&report));
            }
            Ok(())
        }
        Err(SaveError::Validation(issues)) => {
            for issue in &issues {
                eprintln!("error: {}", issue);
            }
            Err(format!("save aborted: {} validation issue(s)", issues.len()).into())
        }
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the draft, run one mutation under the book lock, persist it, and
/// print the returned confirmation line.
fn with_session<F>(start: &std::path::Path, op: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut BudgetTree) -> Result<String, Box<dyn std::error::Error>>,
{
    let book = Book::load(start)?;
    let _lock = BookLock::acquire_default(&book.dir)?;
    let mut tree = draft::read_draft(&book.dir)?;
    let message = op(&mut tree)?;
    draft::write_draft(&book.dir, &tree)?;
    println!("{}", message);
    Ok(())
}
