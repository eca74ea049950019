//! Notmuch CLI wrapper for Rust
//!
//! A type-safe interface to the `notmuch` executable for searching, counting
//! and tagging messages, and for triggering database rebuilds (`notmuch new`).
//!
//! # Example
//!
//! ```no_run
//! use notmuch_cli::{Notmuch, TagChange};
//!
//! let nm = Notmuch::new()?;
//!
//! // Find messages
//! let ids = nm.search_messages("folder:work/INBOX and not tag:inbox")?;
//!
//! // Count without materializing ids
//! let n = nm.count("tag:new")?;
//!
//! // Bulk retag
//! nm.tag(&[TagChange::remove("new"), TagChange::add("unread")], "tag:new")?;
//!
//! // Absorb filesystem changes
//! nm.index()?;
//! # Ok::<(), notmuch_cli::Error>(())
//! ```

use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Errors that can occur when interacting with notmuch
#[derive(Error, Debug)]
pub enum Error {
    #[error("notmuch is not installed or not in PATH")]
    NotInstalled,

    #[error("notmuch is not configured: {0}")]
    NotConfigured(String),

    #[error("Failed to execute notmuch command: {0}")]
    CommandFailed(String),

    #[error("Failed to parse output: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for notmuch operations
pub type Result<T> = std::result::Result<T, Error>;

/// A single tag mutation, rendered as `+tag` or `-tag` on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagChange {
    Add(String),
    Remove(String),
}

impl TagChange {
    pub fn add(tag: impl Into<String>) -> Self {
        TagChange::Add(tag.into())
    }

    pub fn remove(tag: impl Into<String>) -> Self {
        TagChange::Remove(tag.into())
    }

    /// The tag name being changed
    pub fn tag(&self) -> &str {
        match self {
            TagChange::Add(t) | TagChange::Remove(t) => t,
        }
    }

    fn to_arg(&self) -> String {
        match self {
            TagChange::Add(t) => format!("+{}", t),
            TagChange::Remove(t) => format!("-{}", t),
        }
    }
}

impl std::fmt::Display for TagChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_arg())
    }
}

/// Output from a notmuch command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Get combined stdout and stderr output
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Notmuch CLI wrapper
///
/// Every call spawns one `notmuch` process; the external database serializes
/// its own writes, so no in-process locking happens here.
#[derive(Debug, Clone, Default)]
pub struct Notmuch {
    /// Explicit config file, passed via NOTMUCH_CONFIG
    config_file: Option<PathBuf>,
}

impl Notmuch {
    /// Create a new Notmuch instance, failing if the binary is absent
    pub fn new() -> Result<Self> {
        let nm = Self::default();
        if !nm.is_available() {
            return Err(Error::NotInstalled);
        }
        Ok(nm)
    }

    /// Create with an explicit notmuch config file
    pub fn with_config(path: impl Into<PathBuf>) -> Self {
        Self {
            config_file: Some(path.into()),
        }
    }

    /// Check if notmuch is available
    pub fn is_available(&self) -> bool {
        self.run_command(&["--version"]).is_ok()
    }

    /// The database root directory, from `notmuch config get database.path`
    pub fn database_path(&self) -> Result<PathBuf> {
        let output = self.run_command(&["config", "get", "database.path"])?;
        let path = output.stdout.trim();
        if path.is_empty() {
            return Err(Error::NotConfigured(
                "database.path is not set".to_string(),
            ));
        }
        Ok(PathBuf::from(path))
    }

    // --- Read operations ---

    /// Message ids matching a query (without the `id:` prefix)
    pub fn search_messages(&self, query: &str) -> Result<Vec<String>> {
        let output = self.run_command(&[
            "search",
            "--output=messages",
            "--format=json",
            "--",
            query,
        ])?;
        parse_string_list(&output.stdout)
    }

    /// All on-disk locations known for the messages matching a query
    pub fn search_files(&self, query: &str) -> Result<Vec<PathBuf>> {
        let output =
            self.run_command(&["search", "--output=files", "--format=json", "--", query])?;
        Ok(parse_string_list(&output.stdout)?
            .into_iter()
            .map(PathBuf::from)
            .collect())
    }

    /// Number of messages matching a query
    pub fn count(&self, query: &str) -> Result<usize> {
        let output = self.run_command(&["count", "--", query])?;
        let trimmed = output.stdout.trim();
        trimmed
            .parse()
            .map_err(|_| Error::ParseError(format!("expected a count, got {:?}", trimmed)))
    }

    // --- Write operations ---

    /// Apply tag changes to every message matching a query.
    ///
    /// All changes go out in a single `notmuch tag` invocation, so a
    /// remove+add pair is applied atomically from the caller's perspective.
    pub fn tag(&self, changes: &[TagChange], query: &str) -> Result<CommandOutput> {
        if changes.is_empty() {
            return Err(Error::CommandFailed("no tag changes given".to_string()));
        }
        let mut args: Vec<String> = vec!["tag".to_string()];
        args.extend(changes.iter().map(TagChange::to_arg));
        args.push("--".to_string());
        args.push(query.to_string());
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_command(&arg_refs)
    }

    /// Run `notmuch new`: rescan the mail root and absorb filesystem changes
    pub fn index(&self) -> Result<CommandOutput> {
        self.run_command(&["new"])
    }

    // --- Raw command execution ---

    /// Run an arbitrary notmuch command
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        self.run_command(args)
    }

    // --- Private helpers ---

    fn run_command(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut cmd = Command::new("notmuch");
        cmd.args(args);

        if let Some(ref config) = self.config_file {
            cmd.env("NOTMUCH_CONFIG", config);
        }

        let output = cmd.output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            if stderr.contains("No configuration file found")
                || stderr.contains("Error opening database")
            {
                return Err(Error::NotConfigured(stderr));
            }
            return Err(Error::CommandFailed(if stderr.is_empty() {
                format!("notmuch {} exited with {}", args.join(" "), output.status)
            } else {
                stderr
            }));
        }

        Ok(CommandOutput {
            success: output.status.success(),
            stdout,
            stderr,
        })
    }
}

/// Parse notmuch's `--format=json` list output (an array of strings)
fn parse_string_list(stdout: &str) -> Result<Vec<String>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).map_err(Error::from)
}
