//! Milestone listing and creation

use std::fmt;

use chrono::{DateTime, Utc};
use milepost_core::PlannedMilestone;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::client::{decode, expect_status};
use crate::{GitHubClient, Result};

/// Milestone state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    Open,
    Closed,
}

impl fmt::Display for MilestoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MilestoneState::Open => f.write_str("open"),
            MilestoneState::Closed => f.write_str("closed"),
        }
    }
}

/// `state` filter for milestone listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StateFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl StateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::Open => "open",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }
}

/// GitHub milestone representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// Server-assigned number; the only identifier used for assignments
    pub number: u64,
    /// Milestone title
    pub title: String,
    /// Description (empty when unset)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Current state (open/closed)
    pub state: MilestoneState,
    /// Due date
    #[serde(default)]
    pub due_on: Option<DateTime<Utc>>,
    /// Number of open issues in the milestone
    #[serde(default)]
    pub open_issues: u64,
    /// Number of closed issues in the milestone
    #[serde(default)]
    pub closed_issues: u64,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A milestone to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMilestone {
    pub title: String,
    pub description: String,
    pub due_on: Option<DateTime<Utc>>,
}

impl NewMilestone {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_on: None,
        }
    }

    pub fn due_on(mut self, due_on: DateTime<Utc>) -> Self {
        self.due_on = Some(due_on);
        self
    }

    /// Build from a plan entry
    pub fn from_planned(planned: &PlannedMilestone) -> milepost_core::Result<Self> {
        Ok(Self {
            title: planned.title.clone(),
            description: planned.description.clone(),
            due_on: planned.due_date()?,
        })
    }

    /// Request body for `POST /repos/{owner}/{repo}/milestones`
    pub fn to_body(&self) -> serde_json::Value {
        let mut body = json!({
            "title": self.title,
            "description": self.description,
            "state": "open",
        });
        if let Some(due_on) = self.due_on {
            body["due_on"] = json!(due_on.format("%Y-%m-%dT%H:%M:%SZ").to_string());
        }
        body
    }
}

impl GitHubClient {
    /// List milestones in one state
    ///
    /// Single page only: milestones beyond the API's default page size are
    /// not returned.
    pub async fn list_milestones(&self, state: StateFilter) -> Result<Vec<Milestone>> {
        debug!(state = state.as_str(), "Listing milestones");

        let response = self
            .http()
            .get(self.repo_url("/milestones"))
            .query(&[("state", state.as_str())])
            .send()
            .await?;
        let response = expect_status(response, StatusCode::OK).await?;
        let milestones: Vec<Milestone> = decode(response).await?;

        info!(count = milestones.len(), "Fetched milestones");

        Ok(milestones)
    }

    /// Create a milestone; the server must answer 201
    pub async fn create_milestone(&self, milestone: &NewMilestone) -> Result<Milestone> {
        debug!(title = %milestone.title, "Creating milestone");

        let response = self
            .http()
            .post(self.repo_url("/milestones"))
            .json(&milestone.to_body())
            .send()
            .await?;
        let response = expect_status(response, StatusCode::CREATED).await?;
        let created: Milestone = decode(response).await?;

        info!(title = %created.title, number = created.number, "Created milestone");

        Ok(created)
    }
}
