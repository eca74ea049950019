//! tagmail - maildir <-> notmuch tag reconciler
//!
//! Main entry point for the tagmail CLI.

use clap::{Parser, Subcommand};
use notmuch_cli::Notmuch;
use std::path::PathBuf;
use std::process;
use tagmail::store::NotmuchStore;
use tagmail::{cleanup, mailboxes, Reconciler, SyncConfig, SyncReport};

/// Reconcile a maildir tree with a notmuch tag database
#[derive(Parser, Debug)]
#[command(name = "tagmail")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/tagmail/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root of the maildir tree to reconcile
    #[arg(long, env = "MAIL")]
    mail_root: Option<PathBuf>,

    /// Compute and report all actions without executing modifications
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Inbox directory name
    #[arg(long)]
    inbox: Option<String>,

    /// Trash directory name
    #[arg(long)]
    trash: Option<String>,

    /// Sent directory name
    #[arg(long)]
    sent: Option<String>,

    /// Unread tag name
    #[arg(long)]
    tag_unread: Option<String>,

    /// New tag name
    #[arg(long)]
    tag_new: Option<String>,

    /// Collapse each account's folders onto one tag
    #[arg(long)]
    no_multi_account: bool,

    /// Convert the new tag to unread during cleanup instead of dropping it
    #[arg(long)]
    new_is_unread: bool,

    /// Worker pool size (default: available parallelism)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Notmuch config file to use (default: notmuch's own resolution)
    #[arg(long, env = "NOTMUCH_CONFIG")]
    notmuch_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full two-phase reconciliation, reindex and cleanup
    Sync,

    /// List the mailboxes found under the mail root
    Mailboxes,

    /// Run only the cleanup pass (sent-unread demotion, new-tag resolution)
    Cleanup,
}

fn main() {
    if let Err(e) = tagmail::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> tagmail::Result<()> {
    let config = build_config(&cli)?;

    match &cli.command {
        Commands::Mailboxes => {
            for mailbox in mailboxes::find_mailboxes(&config)? {
                println!("{}", mailbox);
            }
            Ok(())
        }
        Commands::Sync => {
            let boxes = mailboxes::find_mailboxes(&config)?;
            let store = NotmuchStore::new(make_notmuch(&cli)?);

            tracing::info!(
                mail_root = %config.mail_root.display(),
                dry_run = config.dry_run,
                "Starting sync"
            );

            let mut report = Reconciler::new(&config, &store).run(&boxes)?;
            report.merge(cleanup::run(&config, &store, &boxes)?);
            finish(&config, &report);
            Ok(())
        }
        Commands::Cleanup => {
            let boxes = mailboxes::find_mailboxes(&config)?;
            let store = NotmuchStore::new(make_notmuch(&cli)?);
            let report = cleanup::run(&config, &store, &boxes)?;
            finish(&config, &report);
            Ok(())
        }
    }
}

fn make_notmuch(cli: &Cli) -> tagmail::Result<Notmuch> {
    match &cli.notmuch_config {
        Some(path) => Ok(Notmuch::with_config(path)),
        None => Ok(Notmuch::new()?),
    }
}

/// Layer CLI flags and environment over the file config, then resolve the
/// mail root (flag/env, then config file, then notmuch's database.path)
fn build_config(cli: &Cli) -> tagmail::Result<SyncConfig> {
    let mut config = match &cli.config {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::load_default()?,
    };

    if let Some(root) = &cli.mail_root {
        config.mail_root = root.clone();
    }
    if let Some(inbox) = &cli.inbox {
        config.inbox = inbox.clone();
    }
    if let Some(trash) = &cli.trash {
        config.trash = trash.clone();
    }
    if let Some(sent) = &cli.sent {
        config.sent = sent.clone();
    }
    if let Some(tag) = &cli.tag_unread {
        config.tag_unread = tag.clone();
    }
    if let Some(tag) = &cli.tag_new {
        config.tag_new = tag.clone();
    }
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    if cli.dry_run {
        config.dry_run = true;
    }
    if cli.no_multi_account {
        config.multi_account = false;
    }
    if cli.new_is_unread {
        config.new_is_unread = true;
    }

    if config.mail_root.as_os_str().is_empty() {
        if let Ok(nm) = make_notmuch(cli) {
            if let Ok(path) = nm.database_path() {
                tracing::debug!(path = %path.display(), "using notmuch database.path as mail root");
                config.mail_root = path;
            }
        }
    }

    config.validate()?;
    Ok(config)
}

fn finish(config: &SyncConfig, report: &SyncReport) {
    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }
    let prefix = if config.dry_run { "dry-run" } else { "sync" };
    println!("tagmail {} complete: {}", prefix, report);
}
