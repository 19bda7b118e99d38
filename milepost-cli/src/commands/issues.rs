//! Issue commands

use clap::{Args, Subcommand};

use crate::session::{Session, TokenArg};

/// Issue commands
#[derive(Args, Debug)]
pub struct IssuesArgs {
    #[command(subcommand)]
    pub command: IssuesCommand,
}

#[derive(Subcommand, Debug)]
pub enum IssuesCommand {
    /// List open issues (pull requests excluded)
    #[command(visible_alias = "ls")]
    List {
        /// Filter by label; combine labels with a comma to require all of them
        #[arg(short, long)]
        label: Option<String>,

        #[command(flatten)]
        token: TokenArg,
    },
}

impl IssuesArgs {
    /// Token given as a trailing argument
    pub fn token_arg(&self) -> Option<&str> {
        match &self.command {
            IssuesCommand::List { token, .. } => token.token.as_deref(),
        }
    }

    /// Execute the issues command
    pub async fn execute(&self, session: &Session, verbose: bool) -> anyhow::Result<()> {
        match &self.command {
            IssuesCommand::List { label, .. } => list_issues(session, label.as_deref(), verbose).await,
        }
    }
}

async fn list_issues(session: &Session, label: Option<&str>, verbose: bool) -> anyhow::Result<()> {
    let client = &session.client;

    if verbose {
        println!(
            "Fetching issues from {}/{}...",
            client.owner(),
            client.repo()
        );
    }

    let issues = client.list_issues(label).await?;

    if issues.is_empty() {
        println!("No issues found.");
        return Ok(());
    }

    println!(
        "Issues in {}/{} ({} found)",
        client.owner(),
        client.repo(),
        issues.len()
    );
    println!();

    for issue in issues {
        let labels = if !issue.labels.is_empty() {
            format!(" [{}]", issue.labels.join(", "))
        } else {
            String::new()
        };

        let milestone = issue
            .milestone
            .as_ref()
            .map(|m| format!(" (Milestone: {} #{})", m.title, m.number))
            .unwrap_or_default();

        println!("#{}: {}{}{}", issue.number, issue.title, labels, milestone);
    }

    Ok(())
}
