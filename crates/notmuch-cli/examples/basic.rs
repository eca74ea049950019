//! Basic notmuch-cli usage: inspect the database and run a few reads.
//!
//! Run with: cargo run --example basic

use notmuch_cli::Notmuch;

fn main() -> notmuch_cli::Result<()> {
    let nm = Notmuch::new()?;

    println!("database: {}", nm.database_path()?.display());
    println!("total messages: {}", nm.count("*")?);
    println!("unread: {}", nm.count("tag:unread")?);

    for id in nm.search_messages("tag:unread")?.iter().take(10) {
        println!("  {}", id);
    }

    Ok(())
}
