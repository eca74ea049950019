//! Path Classifier
//!
//! Pure mappings from filesystem paths under the mail root to folder
//! identifiers, account identifiers and reconciliation tags. All of the
//! path-string munging in tagmail lives here.
//!
//! Identifiers use `/` separators regardless of platform, matching notmuch's
//! `folder:` and `path:` query terms.

use crate::config::SyncConfig;
use std::path::{Component, Path, PathBuf};

/// The maildir structural subdirectories; never part of a folder identifier
const MAILDIR_SUBDIRS: [&str; 3] = ["cur", "new", "tmp"];

/// Root-relative form of `path`, or None for the root itself or a path
/// outside the root
fn root_relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let segments: Vec<&str> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// Folder identifier for a path under the mail root.
///
/// A trailing maildir subdirectory (`cur`, `new`, `tmp`) is stripped, so a
/// message file's parent directory classifies to the mailbox that holds it.
/// Returns None for the root itself.
pub fn folder_of(root: &Path, path: &Path) -> Option<String> {
    let rel = root_relative(root, path)?;
    match rel.rsplit_once('/') {
        Some((parent, last)) if MAILDIR_SUBDIRS.contains(&last) => Some(parent.to_string()),
        _ => Some(rel),
    }
}

/// Account identifier: the first segment of the root-relative path.
///
/// A top-level mailbox with no subfolder is its own account.
pub fn account_of(root: &Path, path: &Path) -> Option<String> {
    let folder = folder_of(root, path)?;
    let account = folder.split('/').next().unwrap_or(&folder);
    Some(account.to_string())
}

/// Reconciliation tag for a path: the folder identifier in multi-account
/// mode, the account identifier when folders collapse per account
pub fn tag_of(config: &SyncConfig, path: &Path) -> Option<String> {
    if config.multi_account {
        folder_of(&config.mail_root, path)
    } else {
        account_of(&config.mail_root, path)
    }
}

/// One enumerated maildir folder with its derived identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// Root-relative folder identifier, e.g. `work/INBOX`
    pub folder: String,
    /// Owning account, e.g. `work`
    pub account: String,
    /// Reconciliation tag mirroring this folder's membership
    pub tag: String,
}

impl Mailbox {
    /// Classify an absolute directory path; None for the mail root itself
    pub fn classify(config: &SyncConfig, path: &Path) -> Option<Self> {
        let folder = folder_of(&config.mail_root, path)?;
        let account = account_of(&config.mail_root, path)?;
        let tag = tag_of(config, path)?;
        Some(Self {
            folder,
            account,
            tag,
        })
    }

    /// Absolute path of this mailbox directory
    pub fn abs_path(&self, config: &SyncConfig) -> PathBuf {
        self.folder
            .split('/')
            .fold(config.mail_root.clone(), |p, seg| p.join(seg))
    }

    /// The `cur` subdirectory, destination for copied-in messages
    pub fn cur_dir(&self, config: &SyncConfig) -> PathBuf {
        self.abs_path(config).join("cur")
    }

    /// Final path segment (the display name of the folder)
    fn leaf(&self) -> &str {
        self.folder.rsplit('/').next().unwrap_or(&self.folder)
    }

    /// Whether this mailbox is the configured Inbox folder
    pub fn is_inbox(&self, config: &SyncConfig) -> bool {
        self.leaf() == config.inbox
    }

    /// Whether this mailbox is the configured Trash folder
    pub fn is_trash(&self, config: &SyncConfig) -> bool {
        self.leaf() == config.trash
    }

    /// Whether this mailbox is the configured Sent folder
    pub fn is_sent(&self, config: &SyncConfig) -> bool {
        self.leaf() == config.sent
    }

    /// Folder term for a special folder within this mailbox's account.
    ///
    /// notmuch folder identifiers carry the account prefix in a
    /// multi-account tree (`work/Trash`), even for an account-root maildir
    /// whose own folder has no `/`; a bare name would match nothing there.
    /// Collapsed mode keeps the bare name.
    pub fn scoped_special(&self, config: &SyncConfig, name: &str) -> String {
        if config.multi_account {
            format!("{}/{}", self.account, name)
        } else {
            name.to_string()
        }
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.folder)
    }
}
