//! Milestone commands

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand, ValueEnum};
use milepost_core::plan::parse_due_date;
use milepost_core::{MenuChoice, MilestonePlan};
use milepost_github::{GitHubClient, MilestoneState, NewMilestone, StateFilter};

use super::{emoji, resolve_menu, MenuPick};
use crate::session::{ask, Session, TokenArg};

/// Milestone commands
#[derive(Args, Debug)]
pub struct MilestonesArgs {
    #[command(subcommand)]
    pub command: MilestonesCommand,
}

#[derive(Subcommand, Debug)]
pub enum MilestonesCommand {
    /// List milestones in the repository
    #[command(visible_alias = "ls")]
    List {
        /// Filter by state
        #[arg(short, long, default_value = "open")]
        state: StateArg,

        #[command(flatten)]
        token: TokenArg,
    },

    /// Create a milestone
    Create {
        /// Milestone title
        #[arg(short, long, required_unless_present = "interactive")]
        title: Option<String>,

        /// Milestone description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        due: Option<String>,

        /// Choose milestones from a menu instead
        #[arg(short, long, conflicts_with = "title")]
        interactive: bool,

        /// Plan file offering predefined milestones in the menu
        #[arg(long, requires = "interactive")]
        plan: Option<PathBuf>,

        #[command(flatten)]
        token: TokenArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateArg {
    Open,
    Closed,
    All,
}

impl From<StateArg> for StateFilter {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Open => StateFilter::Open,
            StateArg::Closed => StateFilter::Closed,
            StateArg::All => StateFilter::All,
        }
    }
}

impl MilestonesArgs {
    /// Token given as a trailing argument
    pub fn token_arg(&self) -> Option<&str> {
        match &self.command {
            MilestonesCommand::List { token, .. } | MilestonesCommand::Create { token, .. } => {
                token.token.as_deref()
            }
        }
    }

    /// Execute the milestones command
    pub async fn execute(&self, session: &Session, no_emoji: bool) -> anyhow::Result<()> {
        match &self.command {
            MilestonesCommand::List { state, .. } => {
                list_milestones(&session.client, (*state).into(), no_emoji).await
            }
            MilestonesCommand::Create {
                title: Some(title),
                description,
                due,
                interactive: false,
                ..
            } => {
                let mut new = NewMilestone::new(title, description);
                if let Some(due) = due {
                    new = new.due_on(parse_due_date(due)?);
                }
                create_one(&session.client, &new, no_emoji).await?;
                Ok(())
            }
            MilestonesCommand::Create { plan, .. } => {
                create_interactive(&session.client, plan.as_deref(), no_emoji).await
            }
        }
    }
}

async fn list_milestones(
    client: &GitHubClient,
    state: StateFilter,
    no_emoji: bool,
) -> anyhow::Result<()> {
    println!(
        "Listing {} milestones for {}...",
        state.as_str(),
        client.repository()
    );

    let milestones = client.list_milestones(state).await?;

    if milestones.is_empty() {
        println!("No {} milestones found.", state.as_str());
        return Ok(());
    }

    println!("Found {} {} milestones:", milestones.len(), state.as_str());

    for m in &milestones {
        let icon = match m.state {
            MilestoneState::Open => "○",
            MilestoneState::Closed => "●",
        };
        println!();
        println!("{} {} {} (#{})", emoji(no_emoji, "📊", "-"), icon, m.title, m.number);
        if !m.description.is_empty() {
            println!("   Description: {}", m.description);
        }
        println!("   State: {}", m.state);
        println!("   Due: {}", super::format_due(m));
        println!("   Open issues: {}", m.open_issues);
        println!("   Closed issues: {}", m.closed_issues);
    }

    Ok(())
}

/// Create one milestone, printing the outcome
async fn create_one(
    client: &GitHubClient,
    new: &NewMilestone,
    no_emoji: bool,
) -> anyhow::Result<u64> {
    match client.create_milestone(new).await {
        Ok(created) => {
            println!(
                "{} Created milestone: {} (#{})",
                emoji(no_emoji, "✅", "[ok]"),
                created.title,
                created.number
            );
            Ok(created.number)
        }
        Err(e) => {
            println!(
                "{} Failed to create milestone '{}': {}",
                emoji(no_emoji, "❌", "[failed]"),
                new.title,
                e
            );
            Err(e.into())
        }
    }
}

async fn create_interactive(
    client: &GitHubClient,
    plan: Option<&std::path::Path>,
    no_emoji: bool,
) -> anyhow::Result<()> {
    let predefined = match plan {
        Some(path) => MilestonePlan::load_from_file(path)
            .with_context(|| format!("Failed to load plan {}", path.display()))?
            .milestones
            .iter()
            .map(NewMilestone::from_planned)
            .collect::<milepost_core::Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    if !predefined.is_empty() {
        println!("Predefined milestones:");
        for (i, m) in predefined.iter().enumerate() {
            let due = m
                .due_on
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "No due date".to_string());
            println!("{}. {} - Due: {}", i + 1, m.title, due);
            if !m.description.is_empty() {
                println!("   {}", m.description);
            }
        }
        println!();
    }

    println!("Options:");
    if !predefined.is_empty() {
        println!("  a - Create all predefined milestones");
        println!("  s - Select specific milestones to create");
    }
    println!("  c - Create a custom milestone");
    println!("  q - Quit");

    let answer = MenuChoice::parse(&ask("\nEnter your choice: ")?);
    let chosen = match resolve_menu(answer, &predefined, true, || {
        ask("Enter milestone numbers (comma-separated, e.g. 1,3): ")
    })? {
        MenuPick::Items(picked) => picked,
        MenuPick::Custom => {
            match ask_custom()? {
                Some(custom) => {
                    // Failure already reported
                    create_one(client, &custom, no_emoji).await.ok();
                }
                None => println!("Milestone title is required."),
            }
            return Ok(());
        }
        MenuPick::Quit => {
            println!("Exiting without creating milestones.");
            return Ok(());
        }
        MenuPick::Invalid => {
            println!("Invalid choice.");
            return Ok(());
        }
    };

    let mut failed = 0usize;
    for new in &chosen {
        if create_one(client, new, no_emoji).await.is_err() {
            failed += 1;
        }
    }

    println!();
    println!(
        "Created {} of {} milestones",
        chosen.len() - failed,
        chosen.len()
    );
    Ok(())
}

fn ask_custom() -> anyhow::Result<Option<NewMilestone>> {
    let title = ask("Enter milestone title: ")?;
    if title.is_empty() {
        return Ok(None);
    }
    let description = ask("Enter milestone description: ")?;
    let due = ask("Enter due date (YYYY-MM-DD, leave empty for none): ")?;

    Ok(Some(custom_milestone(title, description, &due)))
}

/// Build a custom milestone; an unparseable due date is dropped
fn custom_milestone(title: String, description: String, due: &str) -> NewMilestone {
    let new = NewMilestone::new(title, description);
    if due.is_empty() {
        return new;
    }
    match parse_due_date(due) {
        Ok(date) => new.due_on(date),
        Err(_) => {
            println!("Invalid date format. Using no due date.");
            new
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_milestone_due_date() {
        let new = custom_milestone("MVP".to_string(), String::new(), "2025-10-01");
        assert_eq!(
            new.due_on.map(|d| d.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            Some("2025-10-01T00:00:00Z".to_string())
        );
    }

    #[test]
    fn test_custom_milestone_bad_date_dropped() {
        let new = custom_milestone("MVP".to_string(), String::new(), "someday");
        assert_eq!(new.due_on, None);
        assert_eq!(custom_milestone("MVP".to_string(), String::new(), "").due_on, None);
    }
}
