//! Shared test helpers: a client pointed at a mock server and an in-memory
//! [`MilestoneApi`] that records every call

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use milepost_core::config::ApiConfig;
use milepost_core::{RepositorySlug, Token};
use wiremock::MockServer;

use crate::{
    Error, GitHubClient, Issue, Milestone, MilestoneApi, MilestoneState, NewMilestone, Result,
    StateFilter,
};

pub(crate) fn client_for(server: &MockServer) -> GitHubClient {
    let api = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    GitHubClient::with_api(
        RepositorySlug::new("owner", "repo"),
        Token::new("ghp_test").unwrap(),
        &api,
    )
    .unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ListMilestones(StateFilter),
    ListIssues(Option<String>),
    Create(String),
    Assign(u64, u64),
}

#[derive(Default)]
pub(crate) struct FakeApi {
    pub milestones: Mutex<Vec<Milestone>>,
    pub issues: HashMap<Option<String>, Vec<Issue>>,
    pub failing_issues: HashSet<u64>,
    pub failing_titles: HashSet<String>,
    pub fail_listing: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn with_milestones(milestones: Vec<Milestone>) -> Self {
        Self {
            milestones: Mutex::new(milestones),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn assignments(&self) -> Vec<(u64, u64)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Assign(issue, milestone) => Some((issue, milestone)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub(crate) fn milestone(number: u64, title: &str) -> Milestone {
    Milestone {
        number,
        title: title.to_string(),
        description: String::new(),
        state: MilestoneState::Open,
        due_on: None,
        open_issues: 0,
        closed_issues: 0,
    }
}

pub(crate) fn issue(number: u64, title: &str, milestone: Option<(u64, &str)>) -> Issue {
    Issue {
        number,
        title: title.to_string(),
        milestone: milestone.map(|(number, title)| crate::MilestoneRef {
            number,
            title: title.to_string(),
        }),
        labels: Vec::new(),
    }
}

fn rejected(body: &str) -> Error {
    Error::Request {
        status: 422,
        body: body.to_string(),
    }
}

#[async_trait]
impl MilestoneApi for FakeApi {
    async fn list_milestones(&self, state: StateFilter) -> Result<Vec<Milestone>> {
        self.record(Call::ListMilestones(state));
        if self.fail_listing {
            return Err(Error::Request {
                status: 401,
                body: "Bad credentials".to_string(),
            });
        }
        Ok(self.milestones.lock().unwrap().clone())
    }

    async fn list_issues(&self, label: Option<&str>) -> Result<Vec<Issue>> {
        let key = label.map(str::to_string);
        self.record(Call::ListIssues(key.clone()));
        Ok(self.issues.get(&key).cloned().unwrap_or_default())
    }

    async fn create_milestone(&self, new: &NewMilestone) -> Result<Milestone> {
        self.record(Call::Create(new.title.clone()));
        if self.failing_titles.contains(&new.title) {
            return Err(rejected("Validation Failed"));
        }

        let mut milestones = self.milestones.lock().unwrap();
        let number = milestones.iter().map(|m| m.number).max().unwrap_or(0) + 1;
        let mut created = milestone(number, &new.title);
        created.description = new.description.clone();
        created.due_on = new.due_on;
        milestones.push(created.clone());
        Ok(created)
    }

    async fn set_issue_milestone(&self, issue: u64, milestone: u64) -> Result<()> {
        self.record(Call::Assign(issue, milestone));
        if self.failing_issues.contains(&issue) {
            return Err(rejected("Not Found"));
        }
        Ok(())
    }
}
