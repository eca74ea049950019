//! The four corrective actions
//!
//! Pre-phase actions adjust the filesystem to match the tag database (tags
//! lead); post-phase actions adjust tags to match the filesystem (folders
//! lead, as observed by the indexer after the reindex barrier).
//!
//! Every action computes and reports its counts even under dry-run; only the
//! mutation itself is skipped.

use super::report::SyncReport;
use super::TagLocks;
use crate::config::SyncConfig;
use crate::paths::Mailbox;
use crate::store::{Filter, TagChange, TagStore};
use crate::{Result, TagmailError};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Copy-in: tags added, folder count lagging.
///
/// Messages tagged for this mailbox but not yet present in it get copied
/// into its `cur` directory from any still-existing source location.
///
/// In collapsed-account mode the tag maps to every folder of the account,
/// so per-folder membership cannot be read off the tag. There the action
/// only restores messages that have left the account entirely, and only
/// the account's Inbox acts as the restore target.
pub fn copy_in(
    config: &SyncConfig,
    store: &dyn TagStore,
    mailbox: &Mailbox,
) -> Result<SyncReport> {
    let filter = if config.multi_account {
        Filter::new()
            .tag(&mailbox.tag)
            .path_prefix(&mailbox.account)
            .not_folder(&mailbox.folder)
            .not_folder(mailbox.scoped_special(config, &config.trash))
            .not_tag(&config.tag_new)
    } else {
        if !mailbox.is_inbox(config) && mailbox.folder != mailbox.account {
            return Ok(SyncReport::default());
        }
        Filter::new()
            .tag(&mailbox.tag)
            .not_path_prefix(&mailbox.account)
            .not_tag(&config.tag_new)
    };
    debug!(mailbox = %mailbox, query = %filter, "copy-in query");

    let ids = store.search_message_ids(&filter)?;
    let mut report = SyncReport::default();
    let cur = mailbox.cur_dir(config);

    for id in ids {
        let sources = store.search_file_paths(&id)?;
        // First existing path wins, in the order the store returns them
        let Some(source) = sources.iter().find(|p| p.exists()) else {
            let err = TagmailError::SourceMissing(id.to_string());
            warn!(mailbox = %mailbox, message = %id, "no existing source file, skipping copy");
            report.warn(&mailbox.folder, err.to_string());
            continue;
        };

        let Some(name) = source.file_name() else {
            report.warn(&mailbox.folder, format!("source path has no file name: {}", source.display()));
            continue;
        };
        let dest = cur.join(name);

        if config.dry_run {
            info!(
                "Would copy message with new tag to {} (from {})",
                mailbox,
                source.display()
            );
            report.copied += 1;
            continue;
        }

        match fs::copy(source, &dest) {
            Ok(_) => {
                info!("Copied message with new tag to {}", mailbox);
                report.copied += 1;
            }
            Err(e) => {
                warn!(
                    mailbox = %mailbox,
                    source = %source.display(),
                    error = %e,
                    "failed to copy mail file"
                );
                report.warn(
                    &mailbox.folder,
                    format!("failed to copy {}: {}", source.display(), e),
                );
            }
        }
    }

    Ok(report)
}

/// Remove: tags removed, folder count lagging.
///
/// Messages still present in this mailbox but no longer carrying its tag get
/// their file under this mailbox deleted. The Trash mailbox is never a
/// deletion target; messages parked there wait for manual expiry.
pub fn remove_extra(
    config: &SyncConfig,
    store: &dyn TagStore,
    mailbox: &Mailbox,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    if mailbox.is_trash(config) {
        debug!(mailbox = %mailbox, "trash mailbox, skipping remove action");
        return Ok(report);
    }

    let filter = Filter::new()
        .folder(&mailbox.folder)
        .not_tag(&mailbox.tag)
        .not_tag(&config.tag_new);
    debug!(mailbox = %mailbox, query = %filter, "remove query");

    let ids = store.search_message_ids(&filter)?;
    let prefix = mailbox.abs_path(config);

    for id in ids {
        let locations = store.search_file_paths(&id)?;
        let file = locations
            .iter()
            .find(|p| under_mailbox(p, &prefix) && p.exists());

        let Some(file) = file else {
            warn!(mailbox = %mailbox, message = %id, "unable to remove missing mail file");
            report.warn(
                &mailbox.folder,
                format!("unable to remove missing file for message {}", id),
            );
            continue;
        };

        if config.dry_run {
            info!("Would remove untagged message from {}", mailbox);
            report.removed += 1;
            continue;
        }

        match fs::remove_file(file) {
            Ok(()) => {
                info!("Removed untagged message from {}", mailbox);
                report.removed += 1;
            }
            Err(e) => {
                warn!(
                    mailbox = %mailbox,
                    file = %file.display(),
                    error = %e,
                    "failed to remove mail file"
                );
                report.warn(
                    &mailbox.folder,
                    format!("failed to remove {}: {}", file.display(), e),
                );
            }
        }
    }

    Ok(report)
}

/// A location belongs to a mailbox when it sits under the mailbox directory
/// itself, not merely under a folder sharing the name as a prefix
fn under_mailbox(path: &Path, mailbox_dir: &Path) -> bool {
    path.strip_prefix(mailbox_dir).is_ok()
}

/// Tag-add: folder gained a message the database has not tagged yet
pub fn tag_add(
    config: &SyncConfig,
    store: &dyn TagStore,
    mailbox: &Mailbox,
    locks: &TagLocks,
) -> Result<SyncReport> {
    let filter = Filter::new().folder(&mailbox.folder).not_tag(&mailbox.tag);
    debug!(mailbox = %mailbox, query = %filter, "tag-add query");

    let count = store.count(&filter)?;
    let mut report = SyncReport::default();
    if count == 0 {
        return Ok(report);
    }

    if config.dry_run {
        info!("Would tag {} messages with \"{}\"", count, mailbox.tag);
        report.tagged += count;
        return Ok(report);
    }

    let _guard = locks.hold(&mailbox.tag);
    match store.tag(&[TagChange::add(&mailbox.tag)], &filter) {
        Ok(()) => {
            info!("Tagged {} messages with \"{}\"", count, mailbox.tag);
            report.tagged += count;
        }
        Err(e) => {
            warn!(mailbox = %mailbox, error = %e, "tag-add failed");
            report.warn(&mailbox.folder, format!("tag-add failed: {}", e));
        }
    }
    Ok(report)
}

/// Tag-remove: message left every folder backing this tag, tag still present.
///
/// Presence in Trash does not keep a tag alive: a message whose only
/// remaining location is Trash loses its other folder tags here, even though
/// the remove action will never delete its Trash file.
///
/// In collapsed-account mode the tag is backed by every folder of the
/// account, so it only comes off once the message occupies none of them.
/// Removing it while a sibling-folder copy exists would be the mass-removal
/// failure the per-folder queries must avoid.
pub fn tag_remove(
    config: &SyncConfig,
    store: &dyn TagStore,
    mailbox: &Mailbox,
    locks: &TagLocks,
) -> Result<SyncReport> {
    let filter = if config.multi_account {
        Filter::new()
            .tag(&mailbox.tag)
            .path_prefix(&mailbox.account)
            .not_folder(&mailbox.folder)
    } else {
        Filter::new()
            .tag(&mailbox.tag)
            .not_path_prefix(&mailbox.account)
    };
    debug!(mailbox = %mailbox, query = %filter, "tag-remove query");

    let count = store.count(&filter)?;
    let mut report = SyncReport::default();
    if count == 0 {
        return Ok(report);
    }

    if config.dry_run {
        info!("Would untag {} messages, removing \"{}\"", count, mailbox.tag);
        report.untagged += count;
        return Ok(report);
    }

    let _guard = locks.hold(&mailbox.tag);
    match store.tag(&[TagChange::remove(&mailbox.tag)], &filter) {
        Ok(()) => {
            info!("Untagged {} messages, removed \"{}\"", count, mailbox.tag);
            report.untagged += count;
        }
        Err(e) => {
            warn!(mailbox = %mailbox, error = %e, "tag-remove failed");
            report.warn(&mailbox.folder, format!("tag-remove failed: {}", e));
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_under_mailbox() {
        let dir = PathBuf::from("/m/work/INBOX");
        assert!(under_mailbox(Path::new("/m/work/INBOX/cur/msg:2,S"), &dir));
        assert!(!under_mailbox(Path::new("/m/work/INBOX2/cur/msg"), &dir));
        assert!(!under_mailbox(Path::new("/m/work/Archive/cur/msg"), &dir));
    }
}
