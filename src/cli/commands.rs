use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bt", about = concat!("[=] budgetree v", env!("CARGO_PKG_VERSION"), " - hierarchical budgets, reconciled on save"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different book directory's parent
    #[arg(short = 'C', long = "book-dir", global = true)]
    pub book_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new budget book in the current directory
    Init(InitArgs),
    /// Start an editing session from the store's current state
    Checkout(CheckoutArgs),
    /// Show the budget tree
    Tree,
    /// Show one item's details
    Show(ShowArgs),
    /// Add a child item under a parent
    Add(AddArgs),
    /// Insert a sibling item directly after an existing one
    Sib(SibArgs),
    /// Add a new top-level item
    Root(RootArgs),
    /// Edit an item's fields
    Set(SetArgs),
    /// Delete an item (unsaved: removed; saved: marked, or --now)
    Rm(RmArgs),
    /// Undo a pending deletion
    Restore(RestoreArgs),
    /// Validate the session ahead of a save
    Check,
    /// Reconcile the session against the store
    Save,
}

// ---------------------------------------------------------------------------
// Args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Book name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Reinitialize even if budget/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct CheckoutArgs {
    /// Discard an existing session without asking
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Item code (e.g. A.2.1)
    pub code: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Parent item code
    pub parent: String,
    /// New item name
    pub name: String,
}

#[derive(Args)]
pub struct SibArgs {
    /// Code of the item to insert after
    pub after: String,
    /// New item name
    pub name: String,
}

#[derive(Args)]
pub struct RootArgs {
    /// New item name
    pub name: String,
}

#[derive(Args)]
pub struct SetArgs {
    /// Item code
    pub code: String,
    /// Rename the item
    #[arg(long)]
    pub name: Option<String>,
    /// Set the description
    #[arg(long)]
    pub desc: Option<String>,
    /// Occurrences per period (leaves only)
    #[arg(long)]
    pub freq: Option<u32>,
    /// Frequency unit: daily, weekly, monthly, quarterly, yearly, once
    #[arg(long)]
    pub per: Option<String>,
    /// Amount per occurrence
    #[arg(long)]
    pub amount: Option<f64>,
    /// Manual total (ignored when the unit formula applies)
    #[arg(long)]
    pub total: Option<f64>,
    /// Clear frequency, unit amount and total
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args)]
pub struct RmArgs {
    /// Item code
    pub code: String,
    /// Delete from the store immediately instead of at next save
    #[arg(long)]
    pub now: bool,
}

#[derive(Args)]
pub struct RestoreArgs {
    /// Item code
    pub code: String,
}
