use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;

const BUDGET_TOML_TEMPLATE: &str = r#"[book]
name = "{name}"

# Which category/period slice of the store this book edits.
[scope]
category_id = 1
period_id = 1

# Store file, relative to this directory. Stands in for the remote
# budget item service.
[store]
file = "items.json"
"#;

/// `bt init`: scaffold a budget/ book directory in the given directory.
pub fn cmd_init(args: InitArgs, cwd: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let book_dir = cwd.join("budget");
    if book_dir.join("budget.toml").exists() && !args.force {
        return Err("budget/ already exists (use --force to reinitialize)".into());
    }

    let name = match args.name {
        Some(name) => name,
        None => cwd
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("budget")
            .to_string(),
    };

    fs::create_dir_all(&book_dir)?;
    let config = BUDGET_TOML_TEMPLATE.replace("{name}", &name);
    fs::write(book_dir.join("budget.toml"), config)?;

    println!("initialized budget book '{}' in {}", name, book_dir.display());
    println!("next: `bt checkout` to open a session, `bt root <name>` to add an item");
    Ok(())
}
