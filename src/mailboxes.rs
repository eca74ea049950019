//! Mailbox Enumerator
//!
//! Walks the mail root and produces the sorted set of maildir folders. A
//! mailbox is a directory containing a `cur` subdirectory; plain directories
//! are structural and are recursed without being reported. Hidden entries
//! (leading dot) are pruned from descent entirely, so a maildir under
//! `.notmuch/` or `.cache/` never surfaces as a mailbox.

use crate::config::SyncConfig;
use crate::paths::Mailbox;
use crate::{Result, TagmailError};
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Enumerate every mailbox under the configured mail root, in lexical order
pub fn find_mailboxes(config: &SyncConfig) -> Result<Vec<Mailbox>> {
    if !config.mail_root.is_dir() {
        return Err(TagmailError::PathNotFound(config.mail_root.clone()));
    }

    let mut mailboxes = Vec::new();
    let walker = WalkDir::new(&config.mail_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if !entry.path().join("cur").is_dir() {
            continue;
        }
        if let Some(mailbox) = Mailbox::classify(config, entry.path()) {
            mailboxes.push(mailbox);
        }
    }

    Ok(mailboxes)
}
