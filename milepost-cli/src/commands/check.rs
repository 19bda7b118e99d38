//! Token and repository access check

use clap::Args;
use milepost_core::TokenSource;

use super::emoji;
use crate::session::{Session, TokenArg};

/// Verify that the token can read the repository
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub token: TokenArg,
}

impl CheckArgs {
    pub async fn execute(&self, session: &Session, no_emoji: bool) -> anyhow::Result<()> {
        println!("Repository: {}", session.client.repository());
        println!("Token source: {}", session.credentials.describe());

        session.client.check_access().await?;

        println!(
            "{} Token has access to {}",
            emoji(no_emoji, "✅", "[ok]"),
            session.client.repository()
        );
        Ok(())
    }
}
