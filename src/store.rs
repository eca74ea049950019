//! Tag database abstraction
//!
//! The reconciliation engine never builds query strings itself; it expresses
//! what it wants as a [`Filter`] (a conjunction over tag-presence,
//! folder-presence and path-prefix terms) and hands it to a [`TagStore`].
//! The notmuch-backed store renders the filter to query syntax; tests drive
//! the engine with an in-memory store that evaluates the same terms directly.

use crate::{Result, TagmailError};
use notmuch_cli::Notmuch;
use std::path::PathBuf;

pub use notmuch_cli::TagChange;

/// Stable message identifier owned by the tag database
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One query predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Message carries this tag
    Tag(String),
    /// Message occupies this folder (exact folder match)
    Folder(String),
    /// Message has a file location under this root-relative prefix
    PathPrefix(String),
    /// Negation of a predicate
    Not(Box<Term>),
}

/// A conjunction of terms; the unit the engine queries and mutates with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    terms: Vec<Term>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.terms.push(Term::Tag(tag.into()));
        self
    }

    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.terms.push(Term::Folder(folder.into()));
        self
    }

    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.terms.push(Term::PathPrefix(prefix.into()));
        self
    }

    pub fn not_tag(mut self, tag: impl Into<String>) -> Self {
        self.terms.push(Term::Not(Box::new(Term::Tag(tag.into()))));
        self
    }

    pub fn not_folder(mut self, folder: impl Into<String>) -> Self {
        self.terms
            .push(Term::Not(Box::new(Term::Folder(folder.into()))));
        self
    }

    pub fn not_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.terms
            .push(Term::Not(Box::new(Term::PathPrefix(prefix.into()))));
        self
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Render to notmuch query syntax
    pub fn render(&self) -> String {
        self.terms
            .iter()
            .map(render_term)
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

fn render_term(term: &Term) -> String {
    match term {
        Term::Tag(tag) => format!("tag:{}", quote(tag)),
        Term::Folder(folder) => format!("folder:{}", quote(folder)),
        Term::PathPrefix(prefix) => format!("path:{}", quote(&format!("{}/**", prefix))),
        Term::Not(inner) => format!("not {}", render_term(inner)),
    }
}

/// Quote a query value when it contains characters the parser would split on
fn quote(value: &str) -> String {
    if value.contains(char::is_whitespace) || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Read and write access to the external tag database.
///
/// Mutations are real on every implementation; dry-run short-circuits in the
/// engine, before a store is ever called.
pub trait TagStore: Send + Sync {
    /// Message ids matching a filter
    fn search_message_ids(&self, filter: &Filter) -> Result<Vec<MessageId>>;

    /// All known on-disk locations for one message
    fn search_file_paths(&self, id: &MessageId) -> Result<Vec<PathBuf>>;

    /// Number of messages matching a filter, without materializing ids
    fn count(&self, filter: &Filter) -> Result<usize>;

    /// Apply tag changes to every message matching a filter, as one atomic
    /// external invocation. Matching nothing is a no-op, not an error.
    fn tag(&self, changes: &[TagChange], filter: &Filter) -> Result<()>;

    /// Trigger the external indexer to absorb filesystem changes
    fn reindex(&self) -> Result<()>;
}

/// Notmuch-backed tag store
pub struct NotmuchStore {
    nm: Notmuch,
}

impl NotmuchStore {
    pub fn new(nm: Notmuch) -> Self {
        Self { nm }
    }
}

impl TagStore for NotmuchStore {
    fn search_message_ids(&self, filter: &Filter) -> Result<Vec<MessageId>> {
        let ids = self
            .nm
            .search_messages(&filter.render())
            .map_err(|e| TagmailError::QueryFailed(e.to_string()))?;
        Ok(ids.into_iter().map(MessageId::new).collect())
    }

    fn search_file_paths(&self, id: &MessageId) -> Result<Vec<PathBuf>> {
        self.nm
            .search_files(&format!("id:{}", quote(id.as_str())))
            .map_err(|e| TagmailError::QueryFailed(e.to_string()))
    }

    fn count(&self, filter: &Filter) -> Result<usize> {
        self.nm
            .count(&filter.render())
            .map_err(|e| TagmailError::QueryFailed(e.to_string()))
    }

    fn tag(&self, changes: &[TagChange], filter: &Filter) -> Result<()> {
        self.nm
            .tag(changes, &filter.render())
            .map(|_| ())
            .map_err(|e| TagmailError::MutationFailed {
                target: filter.render(),
                reason: e.to_string(),
            })
    }

    fn reindex(&self) -> Result<()> {
        self.nm
            .index()
            .map(|_| ())
            .map_err(|e| TagmailError::ReindexFailed(e.to_string()))
    }
}
