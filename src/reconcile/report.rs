//! Run report accumulation
//!
//! Every phase and mailbox task produces counts and warnings that merge into
//! one `SyncReport`, printed at the end of the run. Warnings never fail the
//! run; they exist so a user can see what was skipped and why.

/// One recoverable problem encountered during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Mailbox (or pass name) the problem occurred in
    pub context: String,
    /// Human-readable description
    pub reason: String,
}

impl Warning {
    pub fn new(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.context, self.reason)
    }
}

/// Aggregated counts and warnings for a run (or any part of one)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Messages copied into a maildir (pre-phase)
    pub copied: usize,
    /// Message files removed from a maildir (pre-phase)
    pub removed: usize,
    /// Messages that gained a reconciliation tag (post-phase)
    pub tagged: usize,
    /// Messages that lost a reconciliation tag (post-phase)
    pub untagged: usize,
    /// Sent-folder messages stripped of the unread tag (cleanup)
    pub unread_cleared: usize,
    /// Messages whose transient new tag was resolved (cleanup)
    pub new_cleared: usize,
    /// Recoverable problems, in encounter order within each mailbox
    pub warnings: Vec<Warning>,
}

impl SyncReport {
    pub fn warn(&mut self, context: impl Into<String>, reason: impl Into<String>) {
        self.warnings.push(Warning::new(context, reason));
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: SyncReport) {
        self.copied += other.copied;
        self.removed += other.removed;
        self.tagged += other.tagged;
        self.untagged += other.untagged;
        self.unread_cleared += other.unread_cleared;
        self.new_cleared += other.new_cleared;
        self.warnings.extend(other.warnings);
    }

    /// True when the run changed (or would change) nothing
    pub fn is_noop(&self) -> bool {
        self.copied == 0
            && self.removed == 0
            && self.tagged == 0
            && self.untagged == 0
            && self.unread_cleared == 0
            && self.new_cleared == 0
    }
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} copied, {} removed, {} tagged, {} untagged, \
             {} unread cleared, {} new resolved, {} warning(s)",
            self.copied,
            self.removed,
            self.tagged,
            self.untagged,
            self.unread_cleared,
            self.new_cleared,
            self.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_accumulates() {
        let mut report = SyncReport {
            copied: 1,
            tagged: 2,
            ..SyncReport::default()
        };
        let mut other = SyncReport {
            copied: 3,
            untagged: 4,
            ..SyncReport::default()
        };
        other.warn("work/INBOX", "missing source");

        report.merge(other);
        assert_eq!(report.copied, 4);
        assert_eq!(report.tagged, 2);
        assert_eq!(report.untagged, 4);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_is_noop() {
        let mut report = SyncReport::default();
        assert!(report.is_noop());

        // Warnings alone still count as a no-op run
        report.warn("work/INBOX", "missing source");
        assert!(report.is_noop());

        report.removed = 1;
        assert!(!report.is_noop());
    }

    #[test]
    fn test_display() {
        let report = SyncReport {
            copied: 2,
            removed: 1,
            ..SyncReport::default()
        };
        let line = report.to_string();
        assert!(line.starts_with("2 copied, 1 removed"));
    }
}
