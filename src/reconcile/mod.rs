//! Reconciliation Engine
//!
//! Pushes every (message, mailbox) pair toward "both" or "neither" in two
//! phases around a single reindex barrier:
//!
//! 1. **Pre-index**: tags lead. Copy tagged messages into mailboxes they are
//!    missing from; delete files whose tag has been removed.
//! 2. **Reindex**: one external rescan, so the database observes the
//!    filesystem changes just made. Nothing from phase two may start before
//!    this returns.
//! 3. **Post-index**: folders lead. Add tags for folders a message occupies;
//!    remove tags for folders it has left.
//!
//! Mailboxes are disjoint directories, so each phase fans its per-mailbox
//! work out over a bounded worker pool. Per-tag mutexes serialize post-phase
//! mutations when collapsed-account mode maps several mailboxes to one tag.

pub mod actions;
pub mod report;

pub use report::{SyncReport, Warning};

use crate::config::SyncConfig;
use crate::paths::Mailbox;
use crate::store::TagStore;
use crate::Result;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

/// One mutex per reconciliation tag, held around bulk tag mutations.
///
/// Only contended in collapsed-account mode, where several mailboxes write
/// to the same tag.
pub struct TagLocks {
    locks: HashMap<String, Mutex<()>>,
}

impl TagLocks {
    pub fn for_mailboxes(mailboxes: &[Mailbox]) -> Self {
        let locks = mailboxes
            .iter()
            .map(|m| (m.tag.clone(), Mutex::new(())))
            .collect();
        Self { locks }
    }

    /// Acquire the mutation lock for a tag
    pub fn hold(&self, tag: &str) -> Option<MutexGuard<'_, ()>> {
        self.locks
            .get(tag)
            .map(|m| m.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Drives a full two-phase reconciliation over a set of mailboxes
pub struct Reconciler<'a> {
    config: &'a SyncConfig,
    store: &'a dyn TagStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a SyncConfig, store: &'a dyn TagStore) -> Self {
        Self { config, store }
    }

    /// Run pre-phase, reindex and post-phase over every mailbox.
    ///
    /// Recoverable per-message failures accumulate into the report; a fatal
    /// error (failed query, failed reindex) aborts after the current phase
    /// has drained, and reindex is never invoked with pre-phase work still
    /// outstanding.
    pub fn run(&self, mailboxes: &[Mailbox]) -> Result<SyncReport> {
        let jobs = self.config.effective_jobs();
        let pool = ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| {
                crate::TagmailError::Config(format!("Failed to build worker pool: {}", e))
            })?;
        let locks = TagLocks::for_mailboxes(mailboxes);
        let mut report = SyncReport::default();

        info!(mailboxes = mailboxes.len(), jobs, "Starting pre-index phase");
        let pre: Vec<Result<SyncReport>> = pool.install(|| {
            mailboxes
                .par_iter()
                .map(|mailbox| self.pre_mailbox(mailbox))
                .collect()
        });
        collect_phase("pre-index", pre, &mut report)?;

        self.reindex()?;

        info!(mailboxes = mailboxes.len(), "Starting post-index phase");
        let post: Vec<Result<SyncReport>> = pool.install(|| {
            mailboxes
                .par_iter()
                .map(|mailbox| self.post_mailbox(mailbox, &locks))
                .collect()
        });
        collect_phase("post-index", post, &mut report)?;

        Ok(report)
    }

    fn pre_mailbox(&self, mailbox: &Mailbox) -> Result<SyncReport> {
        let mut report = actions::copy_in(self.config, self.store, mailbox)?;
        report.merge(actions::remove_extra(self.config, self.store, mailbox)?);
        Ok(report)
    }

    fn post_mailbox(&self, mailbox: &Mailbox, locks: &TagLocks) -> Result<SyncReport> {
        let mut report = actions::tag_add(self.config, self.store, mailbox, locks)?;
        report.merge(actions::tag_remove(self.config, self.store, mailbox, locks)?);
        Ok(report)
    }

    /// Run the external reindex, or skip it under dry-run.
    ///
    /// A live `notmuch new` mutates the database, so dry-run cannot run it.
    /// Post-phase counts are therefore computed against pre-reindex state
    /// and can differ from what a live run would do; pre-phase counts are
    /// exact.
    fn reindex(&self) -> Result<()> {
        if self.config.dry_run {
            info!("Would reindex (skipped in dry-run)");
            return Ok(());
        }
        info!("Reindexing");
        self.store.reindex()
    }
}

/// Merge one phase's per-mailbox results. Non-fatal errors fold into the
/// report as warnings; the first fatal error wins after every mailbox's
/// outcome has been folded in.
fn collect_phase(
    phase: &str,
    results: Vec<Result<SyncReport>>,
    report: &mut SyncReport,
) -> Result<()> {
    let mut fatal = None;
    for result in results {
        match result {
            Ok(outcome) => report.merge(outcome),
            Err(e) if e.is_fatal() => {
                error!(phase, error = %e, "phase failed");
                if fatal.is_none() {
                    fatal = Some(e);
                }
            }
            Err(e) => report.warn(phase, e.to_string()),
        }
    }
    match fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
