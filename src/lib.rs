//! tagmail - tag your folders as your tags as your folders
//!
//! Bidirectional reconciliation between a maildir hierarchy and a notmuch
//! tag database: filing a message into a folder gains it the matching tag,
//! and tagging a message files it into the matching folder.
//!
//! # Architecture
//!
//! - **paths**: pure path -> folder/account/tag classification
//! - **mailboxes**: maildir enumeration under the mail root
//! - **store**: query/mutation abstraction over the tag database
//! - **reconcile**: the two-phase engine around the reindex barrier
//! - **cleanup**: transient-tag housekeeping after reconciliation
//! - **config**: one immutable configuration built at startup

// Core modules
pub mod config;
pub mod error;
pub mod paths;

// Components
pub mod cleanup;
pub mod logging;
pub mod mailboxes;
pub mod reconcile;
pub mod store;

// Re-exports
pub use config::SyncConfig;
pub use error::{Result, TagmailError};
pub use reconcile::{Reconciler, SyncReport};
