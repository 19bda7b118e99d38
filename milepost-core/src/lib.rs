//! Milepost Core - shared plumbing for milepost
//!
//! This crate provides configuration, credential acquisition, milestone plan
//! files and interactive selection parsing used by the GitHub client and CLI.

pub mod config;
pub mod credentials;
pub mod error;
pub mod git;
pub mod plan;
pub mod repository;
pub mod selection;

pub use config::{Config, Overrides};
pub use credentials::{CredentialSource, Token, TokenSource};
pub use error::{Error, Result};
pub use plan::{LabelRule, MilestonePlan, PlannedMilestone};
pub use repository::RepositorySlug;
pub use selection::{MenuChoice, Selection};
