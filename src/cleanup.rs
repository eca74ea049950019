//! Cleanup Pass
//!
//! Post-reconciliation housekeeping on transient tags: sent mail is never
//! meaningfully unread, and the indexer's `new` marker must not outlive a
//! run. Each branch is a single bulk tag command, so a message never ends up
//! half-transitioned (carrying both `new` and `unread`).

use crate::config::SyncConfig;
use crate::paths::Mailbox;
use crate::reconcile::SyncReport;
use crate::store::{Filter, TagChange, TagStore};
use crate::Result;
use tracing::{info, warn};

/// Run the cleanup pass over the enumerated mailboxes
pub fn run(
    config: &SyncConfig,
    store: &dyn TagStore,
    mailboxes: &[Mailbox],
) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    // Demote unread in every Sent folder
    for mailbox in mailboxes.iter().filter(|m| m.is_sent(config)) {
        let filter = Filter::new().folder(&mailbox.folder).tag(&config.tag_unread);
        let count = store.count(&filter)?;
        if count == 0 {
            continue;
        }

        if config.dry_run {
            info!("Would clear \"{}\" from {} messages in {}", config.tag_unread, count, mailbox);
            report.unread_cleared += count;
            continue;
        }

        match store.tag(&[TagChange::remove(&config.tag_unread)], &filter) {
            Ok(()) => {
                info!("Cleared \"{}\" from {} messages in {}", config.tag_unread, count, mailbox);
                report.unread_cleared += count;
            }
            Err(e) => {
                warn!(mailbox = %mailbox, error = %e, "failed to clear unread in sent folder");
                report.warn(&mailbox.folder, format!("failed to clear unread: {}", e));
            }
        }
    }

    // Resolve the transient new tag: drop it, or convert it to unread
    let filter = Filter::new().tag(&config.tag_new);
    let count = store.count(&filter)?;
    if count > 0 {
        let changes = if config.new_is_unread {
            vec![
                TagChange::remove(&config.tag_new),
                TagChange::add(&config.tag_unread),
            ]
        } else {
            vec![TagChange::remove(&config.tag_new)]
        };

        if config.dry_run {
            info!("Would resolve \"{}\" on {} messages", config.tag_new, count);
            report.new_cleared += count;
        } else {
            match store.tag(&changes, &filter) {
                Ok(()) => {
                    info!("Resolved \"{}\" on {} messages", config.tag_new, count);
                    report.new_cleared += count;
                }
                Err(e) => {
                    warn!(error = %e, "failed to resolve new tag");
                    report.warn("cleanup", format!("failed to resolve new tag: {}", e));
                }
            }
        }
    }

    Ok(report)
}
