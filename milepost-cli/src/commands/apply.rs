//! Applying a milestone plan file

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use milepost_core::MilestonePlan;
use milepost_github::{apply_plan, ApplyOptions, MilestoneResolution};

use super::{emoji, print_outcome, print_report};
use crate::session::{Session, TokenArg};

/// Create missing milestones from a plan and assign its issues
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Plan file (TOML)
    pub plan: PathBuf,

    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub token: TokenArg,
}

impl ApplyArgs {
    /// Execute the apply command
    pub async fn execute(&self, session: &Session, no_emoji: bool) -> anyhow::Result<()> {
        let plan = MilestonePlan::load_from_file(&self.plan)
            .with_context(|| format!("Failed to load plan {}", self.plan.display()))?;

        println!(
            "Applying {} milestones from {} to {}{}",
            plan.milestones.len(),
            self.plan.display(),
            session.client.repository(),
            if self.dry_run { " (dry run)" } else { "" }
        );
        println!();

        let options = ApplyOptions {
            dry_run: self.dry_run,
        };
        let result = apply_plan(&session.client, &plan, &options, |o| {
            print_outcome(o, no_emoji)
        })
        .await?;

        println!();
        println!("Summary of milestones:");
        for (title, resolution) in &result.milestones {
            let status = match resolution {
                MilestoneResolution::Existing(n) => format!("#{} (existing)", n),
                MilestoneResolution::Created(n) => format!("#{} (created)", n),
                MilestoneResolution::Pending => "would be created".to_string(),
                MilestoneResolution::Failed(e) => format!(
                    "{} creation failed: {}",
                    emoji(no_emoji, "❌", "[failed]"),
                    e
                ),
            };
            println!("- {}: {}", title, status);
        }

        for error in &result.errors {
            println!("{} {}", emoji(no_emoji, "⚠️", "[warn]"), error);
        }

        if self.dry_run {
            println!();
            println!("Would apply {} assignments:", result.planned.len());
            for assignment in &result.planned {
                println!("  {}", assignment);
            }
        } else {
            print_report(&result.report);
        }

        Ok(())
    }
}
