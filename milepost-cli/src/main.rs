//! Milepost CLI - GitHub milestone planning from the command line
//!
//! List and create milestones, list issues, and assign issues to milestones
//! by explicit pairs, by label, interactively, or from a plan file.

mod commands;
mod session;

use clap::{Parser, Subcommand};
use milepost_core::credentials::Secrets;
use milepost_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ApplyArgs, AssignArgs, CheckArgs, IssuesArgs, MilestonesArgs};
use session::{GlobalArgs, Session};

/// Milepost: GitHub milestone planning and issue assignment
#[derive(Parser, Debug)]
#[command(name = "milepost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use ASCII markers instead of emoji
    #[arg(long, global = true)]
    no_emoji: bool,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// List and create milestones
    #[command(visible_alias = "ms")]
    Milestones(MilestonesArgs),

    /// List open issues
    Issues(IssuesArgs),

    /// Assign issues to milestones
    #[command(visible_alias = "a")]
    Assign(AssignArgs),

    /// Create missing milestones from a plan and assign its issues
    Apply(ApplyArgs),

    /// Verify that the token can read the repository
    Check(CheckArgs),

    /// Show current configuration
    Config {
        /// Write a secrets file template (mode 0600) if none exists
        #[arg(long)]
        init_secrets: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let command = match cli.command {
        Some(Commands::Version) => {
            println!("milepost {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(Commands::Config { init_secrets }) => {
            return show_config(&cli.global, init_secrets);
        }
        Some(command) => command,
        None => {
            println!("Milepost - GitHub milestone planning and issue assignment");
            println!();
            println!("Use --help for usage information");
            return Ok(());
        }
    };

    let positional = match &command {
        Commands::Milestones(args) => args.token_arg(),
        Commands::Issues(args) => args.token_arg(),
        Commands::Assign(args) => args.token_arg(),
        Commands::Apply(args) => args.token.token.as_deref(),
        Commands::Check(args) => args.token.token.as_deref(),
        Commands::Version | Commands::Config { .. } => None,
    };
    let global = cli.global.clone().with_positional_token(positional);

    let session = Session::open(&global, cli.verbose)?;

    let result = match &command {
        Commands::Milestones(args) => args.execute(&session, cli.no_emoji).await,
        Commands::Issues(args) => args.execute(&session, cli.verbose).await,
        Commands::Assign(args) => args.execute(&session, cli.no_emoji).await,
        Commands::Apply(args) => args.execute(&session, cli.no_emoji).await,
        Commands::Check(args) => args.execute(&session, cli.no_emoji).await,
        Commands::Version | Commands::Config { .. } => Ok(()),
    };

    session.finish();
    result
}

fn show_config(global: &GlobalArgs, init_secrets: bool) -> anyhow::Result<()> {
    let config = global.load_config()?;

    println!("Milepost Configuration");
    println!("======================");
    println!();
    println!("Repository:");
    println!(
        "  owner: {}",
        config.repository.owner.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  name: {}",
        config.repository.name.as_deref().unwrap_or("(not set)")
    );
    println!();
    println!("API Settings:");
    println!("  base_url: {}", config.api.base_url);
    println!("  timeout: {:?}", config.api.timeout);
    println!("  user_agent: {}", config.api.user_agent);
    println!();
    println!("Credentials:");
    println!("  source: {:?}", config.credentials.source);
    println!("  env_var: {}", config.credentials.env_var);
    if let Some(file) = &config.credentials.file {
        println!("  file: {}", file.display());
        println!(
            "  delete_file_after_use: {}",
            config.credentials.delete_file_after_use
        );
    }
    println!();

    let config_path = global.config.clone().or_else(Config::default_config_path);
    if let Some(path) = config_path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }

    if let Some(path) = Secrets::default_secrets_path() {
        println!("Secrets file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else if init_secrets {
            Secrets::create_template(&path)?;
            println!("  (created template - add your token and keep mode 0600)");
        } else {
            println!("  (not found - create with `milepost config --init-secrets`)");
        }
    }

    Ok(())
}
