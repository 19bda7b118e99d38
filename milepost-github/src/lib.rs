//! Milepost GitHub - milestone and issue operations on one repository
//!
//! This crate wraps the GitHub REST endpoints for listing and creating
//! milestones, listing issues and setting an issue's milestone, plus the
//! routines that apply batches of assignments and whole milestone plans.

mod api;
pub mod apply;
pub mod assign;
mod client;
mod error;
mod issues;
mod milestones;

#[cfg(test)]
mod test_support;

pub use api::MilestoneApi;
pub use apply::{apply_plan, ApplyOptions, ApplyResult, MilestoneResolution};
pub use assign::{
    apply_assignments, apply_assignments_with, label_assignments, not_in_milestone, Assignment,
    AssignmentOutcome, AssignmentReport,
};
pub use client::{GitHubClient, GITHUB_V3_ACCEPT};
pub use error::{Error, Result};
pub use issues::{Issue, MilestoneRef, ISSUES_PER_PAGE};
pub use milestones::{Milestone, MilestoneState, NewMilestone, StateFilter};
