//! Issue-to-milestone assignment commands

use anyhow::bail;
use clap::{Args, Subcommand};
use milepost_core::{LabelRule, MenuChoice, Selection};
use milepost_github::{
    apply_assignments_with, label_assignments, not_in_milestone, Assignment, GitHubClient, Issue,
    StateFilter,
};

use super::{
    emoji, print_numbered_milestones, print_outcome, print_report, resolve_menu, MenuPick,
};
use crate::session::{ask, Session, TokenArg};

/// Assignment commands
#[derive(Args, Debug)]
pub struct AssignArgs {
    #[command(subcommand)]
    pub command: AssignCommand,
}

#[derive(Subcommand, Debug)]
pub enum AssignCommand {
    /// Assign explicit ISSUE:MILESTONE pairs
    Pairs {
        /// Pairs such as 12:2 (milestone numbers, not titles)
        #[arg(required = true, value_parser = parse_assignment)]
        pairs: Vec<Assignment>,
    },

    /// Assign every open issue with a label to one milestone
    Label {
        /// Label to match
        #[arg(short, long)]
        label: String,

        /// Additional priority label the issues must also carry
        #[arg(short, long)]
        priority: Option<String>,

        /// Target milestone number, or its exact title
        #[arg(short, long)]
        milestone: String,

        #[command(flatten)]
        token: TokenArg,
    },

    /// Pick a milestone and issues from numbered menus
    #[command(visible_alias = "i")]
    Interactive {
        #[command(flatten)]
        token: TokenArg,
    },
}

fn parse_assignment(s: &str) -> Result<Assignment, String> {
    s.parse().map_err(|e: milepost_github::Error| e.to_string())
}

impl AssignArgs {
    /// Token given as a trailing argument (not available for `pairs`)
    pub fn token_arg(&self) -> Option<&str> {
        match &self.command {
            AssignCommand::Pairs { .. } => None,
            AssignCommand::Label { token, .. } | AssignCommand::Interactive { token } => {
                token.token.as_deref()
            }
        }
    }

    /// Execute the assign command
    pub async fn execute(&self, session: &Session, no_emoji: bool) -> anyhow::Result<()> {
        let client = &session.client;
        match &self.command {
            AssignCommand::Pairs { pairs } => {
                println!("Assigning {} issues...", pairs.len());
                run(client, pairs, no_emoji).await;
                Ok(())
            }
            AssignCommand::Label {
                label,
                priority,
                milestone,
                ..
            } => {
                let rule = LabelRule::new(label, priority.clone());
                let number = resolve_milestone(client, milestone).await?;
                let assignments = label_assignments(client, &rule, number).await?;
                if assignments.is_empty() {
                    bail!("No open issues labelled '{}'", rule.query());
                }
                println!(
                    "Assigning {} issues labelled '{}' to milestone #{}...",
                    assignments.len(),
                    rule.query(),
                    number
                );
                run(client, &assignments, no_emoji).await;
                Ok(())
            }
            AssignCommand::Interactive { .. } => interactive(client, no_emoji).await,
        }
    }
}

async fn run(client: &GitHubClient, assignments: &[Assignment], no_emoji: bool) {
    let report = apply_assignments_with(client, assignments, |o| print_outcome(o, no_emoji)).await;
    print_report(&report);
}

/// Accept a milestone number, or look a title up among all milestones
async fn resolve_milestone(client: &GitHubClient, milestone: &str) -> anyhow::Result<u64> {
    if let Ok(number) = milestone.trim_start_matches('#').parse::<u64>() {
        return Ok(number);
    }

    let milestones = client.list_milestones(StateFilter::All).await?;
    match milestones.iter().find(|m| m.title == milestone) {
        Some(found) => Ok(found.number),
        None => bail!("No milestone titled '{}'", milestone),
    }
}

async fn interactive(client: &GitHubClient, no_emoji: bool) -> anyhow::Result<()> {
    let milestones = client.list_milestones(StateFilter::Open).await?;
    if milestones.is_empty() {
        bail!("No milestones found. Create milestones first.");
    }

    println!("Available milestones:");
    print_numbered_milestones(&milestones);

    let input = ask("\nSelect a milestone by number: ")?;
    let picked = Selection::parse(&input, milestones.len()).pick(&milestones);
    let milestone = match picked.as_slice() {
        [only] => *only,
        _ => bail!("Invalid milestone selection."),
    };

    let issues = client.list_issues(None).await?;
    if issues.is_empty() {
        bail!("No open issues found.");
    }

    let pending = not_in_milestone(&issues, milestone.number);
    if pending.is_empty() {
        println!(
            "{} All open issues are already in milestone '{}'.",
            emoji(no_emoji, "✅", "[ok]"),
            milestone.title
        );
        return Ok(());
    }

    println!();
    println!("Issues not in milestone '{}':", milestone.title);
    print_candidates(&pending);

    println!("\nOptions:");
    println!("  a - Assign all listed issues");
    println!("  s - Select specific issues");
    println!("  q - Quit");

    let answer = MenuChoice::parse(&ask("\nEnter your choice: ")?);
    let chosen: Vec<&Issue> = match resolve_menu(answer, &pending, false, || {
        ask("Enter issue numbers from the list (comma-separated, e.g. 1,3,5): ")
    })? {
        MenuPick::Items(picked) => picked.into_iter().copied().collect(),
        MenuPick::Quit => {
            println!("Exiting without assigning issues.");
            return Ok(());
        }
        MenuPick::Custom | MenuPick::Invalid => {
            println!("Invalid choice.");
            return Ok(());
        }
    };

    if chosen.is_empty() {
        println!("No issues selected.");
        return Ok(());
    }

    println!();
    run(
        client,
        &Assignment::all_to(&chosen, milestone.number),
        no_emoji,
    )
    .await;
    Ok(())
}

fn print_candidates(issues: &[&Issue]) {
    for (i, issue) in issues.iter().enumerate() {
        let current = issue
            .milestone
            .as_ref()
            .map(|m| format!(" (Current milestone: {})", m.title))
            .unwrap_or_default();
        println!("{}. #{}: {}{}", i + 1, issue.number, issue.title, current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment_arg() {
        assert_eq!(parse_assignment("12:2").unwrap(), Assignment::new(12, 2));
        assert!(parse_assignment("12-2").unwrap_err().contains("ISSUE:MILESTONE"));
    }
}
