//! tagmail configuration
//!
//! One immutable `SyncConfig`, built once at startup from an optional YAML
//! file (`~/.config/tagmail/config.yaml`) with CLI flags and environment
//! layered on top by `main`. Every component takes it by reference; there is
//! no ambient global state.

use crate::{Result, TagmailError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for a full reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Root of the maildir tree to reconcile
    #[serde(default)]
    pub mail_root: PathBuf,

    /// Compute and report all actions, but mutate nothing
    #[serde(default)]
    pub dry_run: bool,

    /// Inbox directory name
    #[serde(default = "default_inbox")]
    pub inbox: String,

    /// Trash directory name; never a deletion target for the reconciler
    #[serde(default = "default_trash")]
    pub trash: String,

    /// Sent directory name; exempt from the unread tag
    #[serde(default = "default_sent")]
    pub sent: String,

    /// Unread tag name
    #[serde(default = "default_tag_unread")]
    pub tag_unread: String,

    /// Transient tag marking freshly indexed messages
    #[serde(default = "default_tag_new")]
    pub tag_new: String,

    /// Per-folder tags when true; one collapsed tag per account when false
    #[serde(default = "default_multi_account")]
    pub multi_account: bool,

    /// Convert the new tag to unread during cleanup instead of dropping it
    #[serde(default)]
    pub new_is_unread: bool,

    /// Worker pool size for per-mailbox actions; 0 = available parallelism
    #[serde(default)]
    pub jobs: usize,
}

fn default_inbox() -> String {
    "INBOX".to_string()
}

fn default_trash() -> String {
    "Trash".to_string()
}

fn default_sent() -> String {
    "Sent Items".to_string()
}

fn default_tag_unread() -> String {
    "unread".to_string()
}

fn default_tag_new() -> String {
    "new".to_string()
}

fn default_multi_account() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mail_root: PathBuf::new(),
            dry_run: false,
            inbox: default_inbox(),
            trash: default_trash(),
            sent: default_sent(),
            tag_unread: default_tag_unread(),
            tag_new: default_tag_new(),
            multi_account: default_multi_account(),
            new_is_unread: false,
            jobs: 0,
        }
    }
}

impl SyncConfig {
    /// Load from a specific YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TagmailError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: SyncConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from the default location, or plain defaults when no file exists
    ///
    /// Unlike most config-file tools, a missing file is not an error here:
    /// tagmail is fully drivable from flags and environment.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Default config file location (~/.config/tagmail/config.yaml)
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::home_dir()?;
        path.push(".config");
        path.push("tagmail");
        path.push("config.yaml");
        Some(path)
    }

    /// Check invariants that every component relies on
    pub fn validate(&self) -> Result<()> {
        if self.mail_root.as_os_str().is_empty() {
            return Err(TagmailError::Config(
                "mail root is not set; pass --mail-root, set $MAIL, \
                 or configure notmuch's database.path"
                    .to_string(),
            ));
        }
        if !self.mail_root.is_absolute() {
            return Err(TagmailError::Config(format!(
                "mail root must be an absolute path: {}",
                self.mail_root.display()
            )));
        }
        for (name, value) in [
            ("trash", &self.trash),
            ("sent", &self.sent),
            ("tag-unread", &self.tag_unread),
            ("tag-new", &self.tag_new),
        ] {
            if value.is_empty() {
                return Err(TagmailError::Config(format!("{} must not be empty", name)));
            }
        }
        if self.tag_new == self.tag_unread {
            return Err(TagmailError::Config(
                "tag-new and tag-unread must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Worker pool size, resolving 0 to the host's available parallelism
    pub fn effective_jobs(&self) -> usize {
        if self.jobs > 0 {
            self.jobs
        } else {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SyncConfig {
        SyncConfig {
            mail_root: PathBuf::from("/mail"),
            ..SyncConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.inbox, "INBOX");
        assert_eq!(config.trash, "Trash");
        assert_eq!(config.sent, "Sent Items");
        assert_eq!(config.tag_unread, "unread");
        assert_eq!(config.tag_new, "new");
        assert!(config.multi_account);
        assert!(!config.dry_run);
        assert!(!config.new_is_unread);
    }

    #[test]
    fn test_load_partial_yaml() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "mail_root: /home/me/mail\ntrash: Deleted\njobs: 4\n").unwrap();

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.mail_root, PathBuf::from("/home/me/mail"));
        assert_eq!(config.trash, "Deleted");
        assert_eq!(config.jobs, 4);
        // Unspecified fields fall back to defaults
        assert_eq!(config.sent, "Sent Items");
        assert!(config.multi_account);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(SyncConfig::load("/nonexistent/config.yaml").is_err());
    }

    #[test]
    fn test_validate_requires_mail_root() {
        let config = SyncConfig::default();
        assert!(config.validate().is_err());

        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_relative_root() {
        let config = SyncConfig {
            mail_root: PathBuf::from("mail"),
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_colliding_tags() {
        let config = SyncConfig {
            tag_new: "unread".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_effective_jobs() {
        let config = SyncConfig {
            jobs: 3,
            ..valid_config()
        };
        assert_eq!(config.effective_jobs(), 3);

        let auto = valid_config();
        assert!(auto.effective_jobs() >= 1);
    }
}
