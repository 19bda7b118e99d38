//! The four repository operations behind one trait
//!
//! Assignment and plan routines are written against [`MilestoneApi`] so they
//! run unchanged against the real client or a test double.

use async_trait::async_trait;

use crate::{GitHubClient, Issue, Milestone, NewMilestone, Result, StateFilter};

/// Milestone and issue operations on a single repository
#[async_trait]
pub trait MilestoneApi: Send + Sync {
    /// List milestones in one state (single page)
    async fn list_milestones(&self, state: StateFilter) -> Result<Vec<Milestone>>;

    /// List open issues, optionally filtered by label; pull requests excluded
    async fn list_issues(&self, label: Option<&str>) -> Result<Vec<Issue>>;

    /// Create a milestone
    async fn create_milestone(&self, milestone: &NewMilestone) -> Result<Milestone>;

    /// Put an issue into a milestone
    async fn set_issue_milestone(&self, issue: u64, milestone: u64) -> Result<()>;
}

#[async_trait]
impl MilestoneApi for GitHubClient {
    async fn list_milestones(&self, state: StateFilter) -> Result<Vec<Milestone>> {
        GitHubClient::list_milestones(self, state).await
    }

    async fn list_issues(&self, label: Option<&str>) -> Result<Vec<Issue>> {
        GitHubClient::list_issues(self, label).await
    }

    async fn create_milestone(&self, milestone: &NewMilestone) -> Result<Milestone> {
        GitHubClient::create_milestone(self, milestone).await
    }

    async fn set_issue_milestone(&self, issue: u64, milestone: u64) -> Result<()> {
        GitHubClient::set_issue_milestone(self, issue, milestone).await
    }
}
